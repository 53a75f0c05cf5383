// store.rs — 本地日历壁纸仓库
// 持有目录的文件列表缓存和当月前缀，目录有任何改动后都必须调用 invalidate()

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 日历仓库上下文
///
/// 文件列表是懒加载的：第一次调用 [`CalendarStore::files`] 时读取目录，
/// 之后复用，直到 [`CalendarStore::invalidate`] 被调用。
#[derive(Debug)]
pub struct CalendarStore {
    dir: PathBuf,
    label: String,
    listing: Option<Vec<PathBuf>>,
}

impl CalendarStore {
    /// 打开（必要时创建）仓库目录
    pub fn open(dir: impl Into<PathBuf>, label: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            label: label.into(),
            listing: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 当月文件名前缀，例如 `Jan-2017`
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 目录中的普通文件，按路径排序
    ///
    /// 单个条目读取失败只记录日志并跳过。
    pub fn files(&mut self) -> &[PathBuf] {
        let dir = &self.dir;
        self.listing.get_or_insert_with(|| read_listing(dir))
    }

    /// 丢弃缓存的文件列表
    pub fn invalidate(&mut self) {
        self.listing = None;
    }

    /// 是否已经有当月的文件
    pub fn is_current(&mut self) -> bool {
        let label = self.label.clone();
        self.files().iter().any(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&label))
        })
    }

    /// 删除仓库中的全部文件，返回成功删除的数量
    pub fn clear(&mut self) -> usize {
        let files = self.files().to_vec();
        let mut removed = 0;

        for path in files {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove file"),
            }
        }

        self.invalidate();
        removed
    }
}

fn read_listing(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to list store");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read directory entry");
                continue;
            }
        };

        match entry.file_type() {
            Ok(kind) if kind.is_file() => files.push(entry.path()),
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "failed to stat"),
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn current_when_a_file_has_the_label() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "Jan-2017-cal.png");

        let mut jan = CalendarStore::open(tmp.path(), "Jan-2017").unwrap();
        assert!(jan.is_current());

        let mut feb = CalendarStore::open(tmp.path(), "Feb-2017").unwrap();
        assert!(!feb.is_current());
    }

    #[test]
    fn empty_store_is_not_current() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CalendarStore::open(tmp.path().join("calendars"), "Jan-2017").unwrap();
        assert!(store.dir().is_dir());
        assert!(!store.is_current());
        assert!(store.files().is_empty());
    }

    #[test]
    fn listing_is_sorted_and_skips_directories() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "c.png");
        touch(tmp.path(), "a.png");
        touch(tmp.path(), "b.png");
        fs::create_dir(tmp.path().join("nested")).unwrap();

        let mut store = CalendarStore::open(tmp.path(), "Jan-2017").unwrap();
        let names: Vec<_> = store
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn listing_is_cached_until_invalidated() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.png");

        let mut store = CalendarStore::open(tmp.path(), "Jan-2017").unwrap();
        assert_eq!(store.files().len(), 1);

        touch(tmp.path(), "b.png");
        assert_eq!(store.files().len(), 1);

        store.invalidate();
        assert_eq!(store.files().len(), 2);
    }

    #[test]
    fn clear_removes_files_and_refreshes_listing() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "Dec-2016-a.png");
        touch(tmp.path(), "Dec-2016-b.png");

        let mut store = CalendarStore::open(tmp.path(), "Jan-2017").unwrap();
        assert_eq!(store.clear(), 2);
        assert!(store.files().is_empty());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
