// error.rs — 统一错误类型
// 流水线内部的可恢复错误都会被记录后吞掉，这里只负责描述错误本身

use thiserror::Error;

/// wallcal 的错误枚举
#[derive(Debug, Error)]
pub enum Error {
    /// 网络请求失败（连接、超时、HTTP 状态码）
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// 文件系统错误
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// 页面结构不符合预期
    #[error("markup: {0}")]
    Markup(String),

    /// 无法识别的日期字符串
    #[error("invalid date `{0}`")]
    Date(String),

    /// 设置或读取桌面背景失败
    #[error("desktop background ({backend}): {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },

    /// 配置项非法
    #[error("config: {0}")]
    Config(String),

    /// 配置文件序列化失败
    #[error("toml: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn backend(backend: &'static str, reason: impl ToString) -> Self {
        Self::Backend {
            backend,
            reason: reason.to_string(),
        }
    }
}
