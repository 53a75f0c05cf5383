// duckduckgo.rs — 通过 DuckDuckGo 的 HTML 接口搜索月度壁纸文章
// 不需要 API Key；结果链接经过 /l/?uddg= 跳转，需要还原成真实地址

use super::CalendarSource;
use crate::error::Result;
use crate::month::TargetMonth;
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

/// 只接受这个站点的结果
const SITE: &str = "smashingmagazine.com";

pub struct DuckDuckGo {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,

    /// 搜索接口地址
    base_url: String,
}

impl DuckDuckGo {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: String::from("https://html.duckduckgo.com/html/"),
        }
    }

    /// 搜索关键词，例如 `site:smashingmagazine.com desktop wallpaper calendars January 2017`
    pub fn query(month: &TargetMonth) -> String {
        format!("site:{SITE} desktop wallpaper calendars {}", month.search_phrase())
    }
}

#[async_trait]
impl CalendarSource for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn locate(&self, month: &TargetMonth) -> Result<Option<String>> {
        let query = Self::query(month);
        tracing::debug!(%query, "searching");

        let markup = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(first_result(&markup))
    }
}

/// 取第一个指向目标站点的搜索结果
pub fn first_result(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    let results = Selector::parse("a.result__a").ok()?;

    document
        .select(&results)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(unwrap_redirect)
        .find(|url| {
            url.host_str()
                .is_some_and(|host| host == SITE || host.ends_with(&format!(".{SITE}")))
        })
        .map(String::from)
}

/// `//duckduckgo.com/l/?uddg=<编码后的地址>` -> 真实地址；普通链接原样解析
fn unwrap_redirect(href: &str) -> Option<Url> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;

    let target = url
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());

    match target {
        Some(target) => Url::parse(&target).ok(),
        None => Some(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_site_query() {
        let month = TargetMonth::new(2017, 1).unwrap();
        assert_eq!(
            DuckDuckGo::query(&month),
            "site:smashingmagazine.com desktop wallpaper calendars January 2017"
        );
    }

    #[test]
    fn unwraps_redirect_links() {
        let markup = r#"
<div class="results">
  <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fspam&amp;rut=1">spam</a>
  <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.smashingmagazine.com%2F2016%2F12%2Fdesktop-wallpaper-calendars-january-2017%2F&amp;rut=abc">hit</a>
  <a class="result__a" href="https://www.smashingmagazine.com/later/">later</a>
</div>"#;
        assert_eq!(
            first_result(markup).as_deref(),
            Some("https://www.smashingmagazine.com/2016/12/desktop-wallpaper-calendars-january-2017/")
        );
    }

    #[test]
    fn accepts_direct_links() {
        let markup = r#"<a class="result__a" href="https://smashingmagazine.com/x/">x</a>"#;
        assert_eq!(first_result(markup).as_deref(), Some("https://smashingmagazine.com/x/"));
    }

    #[test]
    fn no_matching_result() {
        let markup = r#"<a class="result__a" href="https://notsmashingmagazine.com/x/">x</a>"#;
        assert_eq!(first_result(markup), None);
        assert_eq!(first_result("<p>no results</p>"), None);
    }
}
