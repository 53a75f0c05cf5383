// month.rs — 目标月份
// 决定搜索哪一期日历壁纸，以及下载文件使用的 "Jan-2017" 前缀

use crate::error::{Error, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use std::fmt;

/// 一个具体的年月
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMonth {
    first_day: NaiveDate,
}

impl TargetMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// 当前本地时间所在的月份
    pub fn now() -> Self {
        let today = Local::now().date_naive();
        Self {
            first_day: today.with_day(1).unwrap_or(today),
        }
    }

    /// 解析 `--date` 参数
    ///
    /// 支持 "January 2017"、"Jan 2017"、"Jan-2017"、"2017-01"、"2017/01"，月份名不区分大小写。
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().replace(['-', '/', ','], " ");
        let mut parts = normalized.split_whitespace();
        let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Date(input.to_string()));
        };

        // 数字形式：2017 01
        if let (Ok(year), Ok(month)) = (first.parse::<i32>(), second.parse::<u32>()) {
            return Self::new(year, month).ok_or_else(|| Error::Date(input.to_string()));
        }

        // 名称形式：January 2017 / Jan 2017
        let month = month_from_name(first).ok_or_else(|| Error::Date(input.to_string()))?;
        let year = second
            .parse::<i32>()
            .map_err(|_| Error::Date(input.to_string()))?;
        Self::new(year, month).ok_or_else(|| Error::Date(input.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// 文件名前缀，例如 `Jan-2017`
    pub fn label(&self) -> String {
        self.first_day.format("%b-%Y").to_string()
    }

    /// 搜索用的完整月份，例如 `January 2017`
    pub fn search_phrase(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }

    /// URL 中使用的小写月份名，例如 `january`
    pub fn slug(&self) -> String {
        self.first_day.format("%B").to_string().to_lowercase()
    }

    pub fn previous(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }
}

impl fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.search_phrase())
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    NAMES
        .iter()
        .position(|full| full.starts_with(&name))
        .map(|idx| idx as u32 + 1)
}
