// main.rs — 程序入口
// 负责初始化日志与多语言、解析命令行参数、分发子命令

mod backend;
mod cli;
mod config;
mod download;
mod error;
mod extract;
mod http;
mod matcher;
mod month;
mod pipeline;
mod rotate;
mod source;
mod store;
#[cfg(test)]
mod testutil;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales", fallback = "en");

use clap::{CommandFactory, Parser}; // Parser: parse(); CommandFactory: 生成补全脚本
use clap_complete::generate;
use cli::{Cli, Commands, ConfigAction, RunArgs};
use config::AppConfig;
use matcher::Target;
use month::TargetMonth;
use pipeline::{Mode, Pipeline};
use rust_i18n::t;
use std::time::Instant;
use store::CalendarStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    // 日志输出到 stderr，级别由 WALLCAL_LOG 控制
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WALLCAL_LOG").unwrap_or_else(|_| EnvFilter::new("wallcal=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::new()?;
    config.ensure_dirs()?;

    match cli.command {
        None => handle_run(&config, &cli.run, Mode::Full).await?,
        Some(Commands::Fetch) => handle_run(&config, &cli.run, Mode::FetchOnly).await?,
        Some(Commands::Rotate) => handle_run(&config, &cli.run, Mode::RotateOnly).await?,
        Some(Commands::List) => handle_list(&config, &cli.run)?,
        Some(Commands::Clean) => handle_clean(&config, &cli.run)?,
        Some(Commands::Config { action }) => handle_config(&mut config, &action)?,
        Some(Commands::Completions { shell }) => {
            generate(shell, &mut Cli::command(), "wallcal", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// `--date` 指定的月份，默认本月
fn target_month(args: &RunArgs) -> Result<TargetMonth, error::Error> {
    match &args.date {
        Some(date) => TargetMonth::parse(date),
        None => Ok(TargetMonth::now()),
    }
}

/// 执行流程：检查 → 下载 → 轮换
async fn handle_run(
    config: &AppConfig,
    args: &RunArgs,
    mode: Mode,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let month = target_month(args)?;
    let target = Target::new(
        args.width.unwrap_or(config.width),
        args.height.unwrap_or(config.height),
    );
    let client = http::build_client(config.timeout)?;

    tracing::info!(
        month = %month,
        width = target.width,
        height = target.height,
        engine = config.engine.as_str(),
        backend = config.backend.as_str(),
        "starting"
    );

    let mut pipeline = Pipeline {
        source: source::select(config.engine, client.clone()),
        backend: backend::select(config.backend),
        store: CalendarStore::open(&config.calendar_dir, month.label())?,
        client,
        month,
        target,
        filter: config.filter,
        concurrency: config.concurrency,
    };

    let report = pipeline.run(mode, args.force).await?;
    tracing::info!(?report, "finished");

    println!("{}", t!("completed", elapsed => format!("{:.2?}", start.elapsed())));
    Ok(())
}

/// 处理 list 子命令：列出仓库中的壁纸，当前背景前加 *
fn handle_list(config: &AppConfig, args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let month = target_month(args)?;
    let mut store = CalendarStore::open(&config.calendar_dir, month.label())?;
    let current = backend::select(config.backend).current().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read current background");
        None
    });

    let count = store.files().len();
    println!("{}", t!("list_title", path => store.dir().display(), count => count));
    for file in store.files() {
        let marker = if current.as_deref() == Some(file.as_path()) { "*" } else { " " };
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("  {marker} {name}");
    }
    Ok(())
}

/// 处理 clean 子命令：删除仓库中的所有文件
fn handle_clean(config: &AppConfig, args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let month = target_month(args)?;
    let mut store = CalendarStore::open(&config.calendar_dir, month.label())?;
    println!("{}", t!("cleaning_dir", path => store.dir().display()));
    let removed = store.clear();
    println!("{}", t!("clean_done", count => removed));
    Ok(())
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(
    config: &mut AppConfig,
    action: &ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", t!("config_title"));
            println!("{}", t!("config_path", path => config.config_path.display()));
            println!("{}", t!("config_dir", path => config.calendar_dir.display()));
            println!("{}", t!("config_display", width => config.width, height => config.height));
            println!("{}", t!("config_engine", engine => config.engine.as_str()));
            println!("{}", t!("config_filter", filter => config.filter.as_str()));
            println!("{}", t!("config_backend", backend => config.backend.as_str()));
            println!(
                "{}",
                t!(
                    "config_download",
                    concurrency => config.concurrency,
                    timeout => config.timeout.as_secs()
                )
            );
        }
        ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema());
        }
        ConfigAction::Dump => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            config.save()?;
            println!("{}", t!("config_updated", key => key, value => value));
        }
    }
    Ok(())
}
