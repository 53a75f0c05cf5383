// extract.rs — 日历链接提取
// 从 Smashing Magazine 的月度壁纸文章中解析出每组壁纸的各个尺寸链接

use crate::error::{Error, Result};
use crate::matcher::Candidate;
use regex::Regex;
use schemars::JsonSchema;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// 同一主题壁纸的所有尺寸
pub type Group = Vec<Candidate>;

/// 匹配 "1920x1080"、"1920×1080"、"1920 X 1080" 之类的链接文本
static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<width>\d+)\s*[×xX]\s*(?P<height>\d+)").expect("size regex")
});

/// 每张壁纸在页面上有两行链接：带日历和不带日历，用列表项里的固定文字区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupFilter {
    /// 只要带月历网格的版本
    WithCalendar,
    /// 只要不带月历的版本
    #[default]
    WithoutCalendar,
}

impl GroupFilter {
    /// 判断一个列表项的文字是否属于该类
    pub fn accepts(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        let without = text.contains("without calendar");
        match self {
            Self::WithoutCalendar => without,
            Self::WithCalendar => !without && text.contains("with calendar"),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "with_calendar" | "with" => Some(Self::WithCalendar),
            "without_calendar" | "without" => Some(Self::WithoutCalendar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WithCalendar => "with_calendar",
            Self::WithoutCalendar => "without_calendar",
        }
    }
}

/// 解析一段链接文本中的尺寸
///
/// 数字超出 u32 范围时视为不匹配。
pub fn parse_size(text: &str) -> Option<(u32, u32)> {
    let caps = SIZE_RE.captures(text)?;
    let width = caps["width"].parse().ok()?;
    let height = caps["height"].parse().ok()?;
    Some((width, height))
}

/// 从页面 HTML 中提取所有合格的壁纸组
///
/// 给出 `base` 时，相对链接会被解析为基于它的绝对地址。
pub fn extract_groups(
    markup: &str,
    base: Option<&Url>,
    filter: GroupFilter,
) -> Result<Vec<Group>> {
    let document = Html::parse_document(markup);

    let container = find_container(&document)?
        .ok_or_else(|| Error::Markup("no <article> found on the page".to_string()))?;

    let items = selector("li")?;
    let anchors = selector("a[href]")?;

    let mut groups = Vec::new();
    for item in container.select(&items) {
        let text: String = item.text().collect();
        if !filter.accepts(&text) {
            continue;
        }

        let group: Group = item
            .select(&anchors)
            .filter_map(|anchor| candidate_from(anchor, base))
            .collect();

        if !group.is_empty() {
            groups.push(group);
        }
    }

    tracing::debug!(groups = groups.len(), filter = filter.as_str(), "extracted groups");
    Ok(groups)
}

/// 优先取 `#main` 下的 article，页面改版后退回到第一个 article
fn find_container(document: &Html) -> Result<Option<ElementRef<'_>>> {
    if let Some(article) = document.select(&selector("#main article")?).next() {
        return Ok(Some(article));
    }
    Ok(document.select(&selector("article")?).next())
}

fn candidate_from(anchor: ElementRef<'_>, base: Option<&Url>) -> Option<Candidate> {
    let text: String = anchor.text().collect();
    let (width, height) = parse_size(&text)?;
    let href = anchor.value().attr("href")?.trim();

    let link = match base {
        Some(base) => base.join(href).ok()?.to_string(),
        None => href.to_string(),
    };

    Some(Candidate::new(width, height, link))
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Markup(format!("bad selector `{css}`: {e}")))
}
