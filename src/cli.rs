// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义全局参数和子命令

use clap::{Args, Parser, Subcommand}; // Parser: 解析命令行参数; Subcommand: 定义子命令
use clap_complete::Shell; // Shell 枚举：Bash, Zsh, Fish, Elvish, PowerShell

/// 月度日历壁纸轮换工具
///
/// 每月从 Smashing Magazine 下载适合当前显示器的日历壁纸，
/// 每次运行把桌面背景切换到下一张。适合放进 cron 定时执行。
#[derive(Parser, Debug)]
#[command(name = "wallcal")]
#[command(version)] // 自动从 Cargo.toml 读取 version 字段
#[command(author)] // 自动从 Cargo.toml 读取 authors 字段
#[command(about = "Monthly desktop wallpaper calendars: fetch the best size for your display and rotate through them")]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    /// 不指定子命令时执行完整流程：检查 → 下载 → 轮换
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 完整流程使用的参数，所有子命令共享
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// 显示宽度（默认取配置文件，否则 1920）
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// 显示高度（默认取配置文件，否则 1080）
    #[arg(short = 't', long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// 即使当月壁纸已存在也重新下载
    #[arg(short, long, global = true)]
    pub force: bool,

    /// 目标月份，如 "January 2017"、"Jan-2017"、"2017-01"（默认本月）
    #[arg(short, long, global = true)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 只切换到下一张背景，不检查更新
    ///
    /// 用法示例:
    ///   wallcal rotate
    Rotate,

    /// 只检查并下载当月壁纸，不切换背景
    ///
    /// 用法示例:
    ///   wallcal fetch --force
    ///   wallcal fetch -d "March 2024" -w 2560 -t 1440
    Fetch,

    /// 列出仓库中的壁纸，标出当前背景
    List,

    /// 删除仓库中的所有壁纸
    Clean,

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   wallcal config show
    ///   wallcal config set width 2560
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   wallcal completions zsh > ~/.zsh/completions/_wallcal
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },
}

/// 配置管理操作
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// 查看当前所有配置简报
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印当前完整配置内容
    Dump,
    /// 设置配置项 (width, height, dir, engine, filter, backend, concurrency, timeout)
    Set {
        /// 要设置的键
        key: String,
        /// 要设置的值
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_pipeline() {
        let cli = Cli::parse_from(["wallcal"]);
        assert!(cli.command.is_none());
        assert!(!cli.run.force);
        assert_eq!(cli.run.width, None);
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from(["wallcal", "-w", "2560", "-t", "1440", "-f", "-d", "Jan 2017"]);
        assert_eq!(cli.run.width, Some(2560));
        assert_eq!(cli.run.height, Some(1440));
        assert!(cli.run.force);
        assert_eq!(cli.run.date.as_deref(), Some("Jan 2017"));
    }

    #[test]
    fn flags_are_accepted_after_subcommand() {
        let cli = Cli::parse_from(["wallcal", "fetch", "--force", "--width", "3840"]);
        assert!(matches!(cli.command, Some(Commands::Fetch)));
        assert!(cli.run.force);
        assert_eq!(cli.run.width, Some(3840));
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(Cli::try_parse_from(["wallcal", "--width", "0"]).is_err());
    }
}
