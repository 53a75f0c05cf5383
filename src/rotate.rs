// rotate.rs — 背景轮换
// 把桌面背景切换到仓库中的下一张图片，到末尾后回到第一张

use crate::backend::DesktopBackground;
use crate::error::Result;
use crate::store::CalendarStore;
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// 计算下一张图片的下标
///
/// - 列表为空：`None`
/// - 当前背景在列表中：下一个，越界回到 0
/// - 当前背景未知或不在列表中：0
pub fn next_index(files: &[PathBuf], current: Option<&Path>) -> Option<usize> {
    if files.is_empty() {
        return None;
    }

    let position = current.and_then(|current| files.iter().position(|f| f == current));
    Some(match position {
        Some(idx) if idx + 1 < files.len() => idx + 1,
        _ => 0,
    })
}

/// 切换到下一张背景，返回新设置的图片路径
///
/// 读取当前背景失败只记录日志；仓库为空时什么也不做。
pub fn rotate(store: &mut CalendarStore, backend: &dyn DesktopBackground) -> Result<Option<PathBuf>> {
    let current = match backend.current() {
        Ok(current) => current,
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "could not read current background");
            None
        }
    };

    if let Some(current) = &current {
        println!("{}", t!("current_background", path => current.display()));
    }

    let files = store.files();
    let Some(idx) = next_index(files, current.as_deref()) else {
        tracing::info!(dir = %store.dir().display(), "store is empty, nothing to rotate");
        println!("{}", t!("store_empty"));
        return Ok(None);
    };

    let next = files[idx].clone();
    println!("{}", t!("setting_background", path => next.display()));
    backend.set(&next)?;
    Ok(Some(next))
}
