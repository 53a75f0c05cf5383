// pipeline.rs — 运行流程
// 检查 → (下载) → 轮换，每一步都是一个状态，网络错误只记录日志不中断

use crate::backend::DesktopBackground;
use crate::download;
use crate::error::Result;
use crate::extract::{self, GroupFilter};
use crate::http;
use crate::matcher::{self, Selection, Target};
use crate::month::TargetMonth;
use crate::rotate;
use crate::source::CalendarSource;
use crate::store::CalendarStore;
use rust_i18n::t;
use std::path::PathBuf;
use url::Url;

/// 流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Check,
    Fetch,
    Rotate,
    Done,
}

/// 运行哪些阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 检查、按需下载、轮换
    Full,
    /// 检查、按需下载
    FetchOnly,
    /// 只轮换
    RotateOnly,
}

/// 一次运行的结果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 选中的壁纸数
    pub selected: usize,
    /// 成功下载的文件数
    pub downloaded: usize,
    /// 新设置的背景
    pub background: Option<PathBuf>,
}

/// Check 状态的转移：不是当月的或者强制刷新时进入 Fetch
pub fn after_check(is_current: bool, force: bool) -> RunState {
    if force || !is_current {
        RunState::Fetch
    } else {
        RunState::Rotate
    }
}

/// 流程上下文：所有协作者在启动时选定后传进来
pub struct Pipeline {
    pub client: reqwest::Client,
    pub source: Box<dyn CalendarSource>,
    pub backend: Box<dyn DesktopBackground>,
    pub store: CalendarStore,
    pub month: TargetMonth,
    pub target: Target,
    pub filter: GroupFilter,
    pub concurrency: usize,
}

impl Pipeline {
    /// 按状态机执行
    pub async fn run(&mut self, mode: Mode, force: bool) -> Result<RunReport> {
        let mut report = RunReport::default();
        let mut state = match mode {
            Mode::RotateOnly => RunState::Rotate,
            _ => RunState::Check,
        };

        loop {
            tracing::debug!(?state, "pipeline");
            state = match state {
                RunState::Check => {
                    let next = after_check(self.store.is_current(), force);
                    if next == RunState::Rotate {
                        println!("{}", t!("up_to_date", label => self.store.label()));
                    }
                    match (next, mode) {
                        (RunState::Rotate, Mode::FetchOnly) => RunState::Done,
                        (next, _) => next,
                    }
                }
                RunState::Fetch => {
                    let (selected, downloaded) = self.fetch().await;
                    report.selected = selected;
                    report.downloaded = downloaded;
                    if mode == Mode::FetchOnly {
                        RunState::Done
                    } else {
                        RunState::Rotate
                    }
                }
                RunState::Rotate => {
                    report.background = rotate::rotate(&mut self.store, self.backend.as_ref())?;
                    RunState::Done
                }
                RunState::Done => return Ok(report),
            };
        }
    }

    /// 查找并下载当月壁纸，返回 (选中数, 下载数)
    ///
    /// 找不到文章或网络失败时视为没有选中任何壁纸，旧文件保持不变。
    pub async fn fetch(&mut self) -> (usize, usize) {
        let selections = match self.find_selections().await {
            Ok(selections) => selections,
            Err(e) => {
                tracing::warn!(error = %e, "could not look up calendars");
                println!("{}", t!("fetch_failed"));
                Vec::new()
            }
        };

        println!("{}", t!("found_calendars", count => selections.len()));
        if selections.is_empty() {
            return (0, 0);
        }

        let removed = self.store.clear();
        tracing::info!(removed, "cleared old calendars");

        let urls: Vec<String> = selections.iter().map(|s| s.link.clone()).collect();
        let saved = download::download(
            &self.client,
            &urls,
            self.store.dir(),
            self.store.label(),
            self.concurrency,
        )
        .await;
        self.store.invalidate();

        println!("{}", t!("download_done", count => saved.len(), total => urls.len()));
        (selections.len(), saved.len())
    }

    async fn find_selections(&self) -> Result<Vec<Selection>> {
        let Some(url) = self.source.locate(&self.month).await? else {
            tracing::warn!(source = self.source.name(), month = %self.month, "no article found");
            return Ok(Vec::new());
        };

        println!("{}", t!("looking_up", url => url));
        let markup = http::fetch_markup(&self.client, &url).await?;

        let base = Url::parse(&url).ok();
        let groups = extract::extract_groups(&markup, base.as_ref(), self.filter)?;

        Ok(matcher::select_all(
            self.target,
            groups.iter().map(Vec::as_slice),
        ))
    }
}
