// archive.rs — 按固定规则拼出 Smashing Magazine 的月度壁纸文章地址
//
// 某月的壁纸在上个月底发布，例如 2017 年 1 月的文章位于
// https://www.smashingmagazine.com/2016/12/desktop-wallpaper-calendars-january-2017/

use super::CalendarSource;
use crate::error::Result;
use crate::month::TargetMonth;
use async_trait::async_trait;

pub struct SmashingArchive {
    /// 站点根地址
    base_url: String,
}

impl SmashingArchive {
    pub fn new() -> Self {
        Self::with_base_url("https://www.smashingmagazine.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 文章地址
    pub fn article_url(&self, month: &TargetMonth) -> String {
        let published = month.previous();
        format!(
            "{}/{}/{:02}/desktop-wallpaper-calendars-{}-{}/",
            self.base_url,
            published.year(),
            published.month(),
            month.slug(),
            month.year()
        )
    }
}

impl Default for SmashingArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarSource for SmashingArchive {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn locate(&self, month: &TargetMonth) -> Result<Option<String>> {
        Ok(Some(self.article_url(month)))
    }
}
