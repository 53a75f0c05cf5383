// download.rs — 并发下载
// 把选中的壁纸并发下载到仓库目录，文件名为 <前缀>-<URL 最后一段>

use crate::error::Result;
use futures::stream::{self, StreamExt};
use rust_i18n::t;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// 默认同时进行的下载数
pub const DEFAULT_CONCURRENCY: usize = 8;

/// 由 URL 推出保存的文件名
///
/// 取最后一段路径并去掉查询参数；为空时使用 `wallpaper.jpg`。
pub fn file_name_for(url: &str, prefix: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or("wallpaper.jpg");
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}-{name}")
    }
}

/// 并发下载所有 URL，最多同时 `concurrency` 个
///
/// 单个文件失败只影响它自己：记录日志，不重试，也不出现在返回值里。
/// 多个 URL 对应同一个文件名时只下载第一个。
/// 返回成功写入的文件路径（顺序与完成顺序一致）。
pub async fn download(
    client: &reqwest::Client,
    urls: &[String],
    dir: &Path,
    prefix: &str,
    concurrency: usize,
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();
    for url in urls {
        let name = file_name_for(url, prefix);
        if seen.insert(name.clone()) {
            jobs.push((url, dir.join(name)));
        } else {
            tracing::warn!(url = %url, file = %name, "skipping url with duplicate file name");
        }
    }

    stream::iter(jobs)
        .map(|(url, save_path)| async move {
            match download_one(client, url, &save_path).await {
                Ok(()) => {
                    println!("{}", t!("downloaded", url => url));
                    Some(save_path)
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "download failed");
                    None
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|saved| async move { saved })
        .collect()
        .await
}

async fn download_one(client: &reqwest::Client, url: &str, save_path: &Path) -> Result<()> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    let mut file = File::create(save_path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;

    tracing::debug!(url, path = %save_path.display(), size = bytes.len(), "saved");
    Ok(())
}
