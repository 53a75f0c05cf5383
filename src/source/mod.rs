// source/mod.rs — 日历文章来源
// 定义了查找某月壁纸文章地址的通用 Trait，以及两种实现
pub mod archive;
pub mod duckduckgo;

use crate::error::Result;
use crate::month::TargetMonth;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use archive::SmashingArchive;
pub use duckduckgo::DuckDuckGo;

/// 查找月度壁纸文章地址的抽象 Trait
///
/// # 异步 Trait 说明
/// 使用 `async_trait` 宏以便通过 `Box<dyn CalendarSource>` 动态分发。
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// 来源名称（如 "archive"）
    fn name(&self) -> &'static str;

    /// 返回文章 URL；找不到时返回 `None`
    async fn locate(&self, month: &TargetMonth) -> Result<Option<String>>;
}

/// 配置文件中的来源选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceEngine {
    /// 直接按固定规则拼出文章地址
    #[default]
    Archive,
    /// 通过 DuckDuckGo 搜索
    DuckDuckGo,
}

impl SourceEngine {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "archive" => Some(Self::Archive),
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::DuckDuckGo => "duckduckgo",
        }
    }
}

/// 根据配置创建来源
pub fn select(engine: SourceEngine, client: reqwest::Client) -> Box<dyn CalendarSource> {
    match engine {
        SourceEngine::Archive => Box::new(SmashingArchive::new()),
        SourceEngine::DuckDuckGo => Box::new(DuckDuckGo::new(client)),
    }
}
