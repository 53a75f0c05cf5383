// config.rs — 配置管理模块
// 遵循 Unix 风格：优先从 ~/.config/wallcal/config.toml 读取配置

use crate::backend::BackendKind;
use crate::download::DEFAULT_CONCURRENCY;
use crate::error::{Error, Result};
use crate::extract::GroupFilter;
use crate::source::SourceEngine;
use schemars::JsonSchema; // 引入用于生成 JSON Schema 的 trait
use serde::{Deserialize, Serialize}; // 引入序列化与反序列化 trait
use std::env; // 环境变量模块
use std::fs; // 文件系统模块
use std::path::{Path, PathBuf}; // 路径处理类型
use std::time::Duration;

/// 展开路径中的 ~ 和环境变量 ($HOME, ${XDG_PICTURES_DIR} 等)，相对路径则相对于 $HOME
/// 变量无法展开时保留原样
fn expand_path(path_str: &str, home: &Path) -> PathBuf {
    let expanded = shellexpand::full(path_str)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path_str.to_string());
    let p = PathBuf::from(expanded);
    if p.is_absolute() { p } else { home.join(p) }
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    store: StoreConfig,
    #[serde(default)]
    display: DisplayConfig,
    #[serde(default)]
    source: SourceConfig,
    #[serde(default)]
    download: DownloadConfig,
    #[serde(default)]
    desktop: DesktopConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct StoreConfig {
    /// 日历壁纸保存目录 (支持 ~、$HOME 等环境变量，相对路径则相对于 $HOME)
    /// 不配置则默认为 ~/calendars
    dir: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct DisplayConfig {
    /// 目标显示宽度（像素）
    #[serde(default = "default_width")]
    width: u32,
    /// 目标显示高度（像素）
    #[serde(default = "default_height")]
    height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct SourceConfig {
    /// 文章地址的查找方式 (archive / duckduckgo)
    #[serde(default)]
    engine: SourceEngine,
    /// 下载带日历还是不带日历的版本 (with_calendar / without_calendar)
    #[serde(default)]
    filter: GroupFilter,
    /// 单个请求的超时秒数
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            engine: SourceEngine::default(),
            filter: GroupFilter::default(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct DownloadConfig {
    /// 同时下载的文件数
    #[serde(default = "default_concurrency")]
    concurrency: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct DesktopConfig {
    /// 设置桌面背景的方式 (auto / gnome / system)
    #[serde(default)]
    backend: BackendKind,
}

fn default_width() -> u32 {
    1920
}
fn default_height() -> u32 {
    1080
}
fn default_timeout() -> u64 {
    60
}
fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// 应用全局配置项
#[derive(Debug)]
pub struct AppConfig {
    /// 用户主目录，解析相对路径时使用
    home: PathBuf,
    /// 配置文件所在路径
    pub config_path: PathBuf,
    /// 日历壁纸目录 (优先级：ENV > TOML > 默认)
    pub calendar_dir: PathBuf,
    /// 默认显示宽度
    pub width: u32,
    /// 默认显示高度
    pub height: u32,
    /// 文章来源
    pub engine: SourceEngine,
    /// 壁纸组筛选
    pub filter: GroupFilter,
    /// 请求超时
    pub timeout: Duration,
    /// 下载并发数
    pub concurrency: usize,
    /// 桌面背景后端 (优先级：ENV > TOML)
    pub backend: BackendKind,
    /// 被环境变量覆盖前的文件值，保存时写回这些而不是环境变量的值
    file_values: FileValues,
}

#[derive(Debug, Default)]
struct FileValues {
    calendar_dir: Option<PathBuf>,
    backend: Option<BackendKind>,
}

impl AppConfig {
    /// 读取 $HOME 下的配置文件并应用环境变量
    pub fn new() -> Result<Self> {
        let home = env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| Error::Config("$HOME is not set".to_string()))?;
        let config_path = home.join(".config").join("wallcal").join("config.toml");

        let mut config = Self::load(&home, config_path);
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// 应用 `WALLCAL_DIR` / `WALLCAL_BACKEND` 覆盖
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("WALLCAL_DIR") {
            let dir = expand_path(&dir, &self.home);
            self.file_values.calendar_dir = Some(std::mem::replace(&mut self.calendar_dir, dir));
        }
        if let Some(backend) = lookup("WALLCAL_BACKEND") {
            match BackendKind::parse(&backend) {
                Some(kind) => {
                    self.file_values.backend = Some(std::mem::replace(&mut self.backend, kind));
                }
                None => tracing::warn!(%backend, "ignoring unknown WALLCAL_BACKEND"),
            }
        }
    }

    /// 从指定的配置文件加载；文件不存在或内容非法时使用默认值
    pub fn load(home: &Path, config_path: PathBuf) -> Self {
        let config_file = Self::load_config_from_file(&config_path).unwrap_or_default();
        Self::from_file(home, config_path, config_file)
    }

    fn from_file(home: &Path, config_path: PathBuf, file: ConfigFile) -> Self {
        let calendar_dir = match file.store.dir {
            Some(dir) => expand_path(&dir, home),
            None => home.join("calendars"),
        };

        Self {
            home: home.to_path_buf(),
            config_path,
            calendar_dir,
            width: file.display.width.max(1),
            height: file.display.height.max(1),
            engine: file.source.engine,
            filter: file.source.filter,
            timeout: Duration::from_secs(file.source.timeout_secs.max(1)),
            concurrency: file.download.concurrency.max(1),
            backend: file.desktop.backend,
            file_values: FileValues::default(),
        }
    }

    /// 辅助函数：解析 TOML 配置文件
    fn load_config_from_file(path: &Path) -> Option<ConfigFile> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                None
            }
        }
    }

    /// 确保配置目录和壁纸目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&self.calendar_dir)
    }

    /// 修改一个配置项（`config set` 子命令）
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || Error::Config(format!("invalid value `{value}` for `{key}`"));

        match key {
            "width" => self.width = parse_positive(value).ok_or_else(invalid)?,
            "height" => self.height = parse_positive(value).ok_or_else(invalid)?,
            "dir" => {
                self.calendar_dir = expand_path(value, &self.home);
                self.file_values.calendar_dir = None;
            }
            "engine" => self.engine = SourceEngine::parse(value).ok_or_else(invalid)?,
            "filter" => self.filter = GroupFilter::parse(value).ok_or_else(invalid)?,
            "backend" => {
                self.backend = BackendKind::parse(value).ok_or_else(invalid)?;
                self.file_values.backend = None;
            }
            "concurrency" => {
                self.concurrency = parse_positive(value).ok_or_else(invalid)? as usize
            }
            "timeout" => {
                self.timeout = Duration::from_secs(u64::from(parse_positive(value).ok_or_else(invalid)?))
            }
            _ => return Err(Error::Config(format!("unknown key `{key}`"))),
        }
        Ok(())
    }

    /// 将配置保存回文件；环境变量覆盖的项保留文件里原来的值
    pub fn save(&self) -> Result<()> {
        let mut file = self.to_config_file();
        if let Some(dir) = &self.file_values.calendar_dir {
            file.store.dir = Some(dir.to_string_lossy().to_string());
        }
        if let Some(backend) = self.file_values.backend {
            file.desktop.backend = backend;
        }
        fs::write(&self.config_path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }

    /// 将当前生效的配置转换为 TOML 字符串
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_config_file())?)
    }

    fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            store: StoreConfig {
                dir: Some(self.calendar_dir.to_string_lossy().to_string()),
            },
            display: DisplayConfig {
                width: self.width,
                height: self.height,
            },
            source: SourceConfig {
                engine: self.engine,
                filter: self.filter,
                timeout_secs: self.timeout.as_secs(),
            },
            download: DownloadConfig {
                concurrency: self.concurrency,
            },
            desktop: DesktopConfig {
                backend: self.backend,
            },
        }
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(content: &str) -> AppConfig {
        let home = Path::new("/home/me");
        let file: ConfigFile = toml::from_str(content).unwrap();
        AppConfig::from_file(home, home.join(".config/wallcal/config.toml"), file)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = config_from("");
        assert_eq!(config.calendar_dir, PathBuf::from("/home/me/calendars"));
        assert_eq!((config.width, config.height), (1920, 1080));
        assert_eq!(config.engine, SourceEngine::Archive);
        assert_eq!(config.filter, GroupFilter::WithoutCalendar);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.backend, BackendKind::Auto);
    }

    #[test]
    fn reads_every_section() {
        let config = config_from(
            r#"
[store]
dir = "Pictures/cal"

[display]
width = 2560
height = 1440

[source]
engine = "duckduckgo"
filter = "with_calendar"
timeout_secs = 10

[download]
concurrency = 4

[desktop]
backend = "gnome"
"#,
        );
        assert_eq!(config.calendar_dir, PathBuf::from("/home/me/Pictures/cal"));
        assert_eq!((config.width, config.height), (2560, 1440));
        assert_eq!(config.engine, SourceEngine::DuckDuckGo);
        assert_eq!(config.filter, GroupFilter::WithCalendar);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.backend, BackendKind::Gnome);
    }

    #[test]
    fn zero_values_are_clamped() {
        let config = config_from("[display]\nwidth = 0\nheight = 0\n[download]\nconcurrency = 0\n");
        assert_eq!((config.width, config.height, config.concurrency), (1, 1, 1));
    }

    #[test]
    fn set_validates_values() {
        let mut config = config_from("");
        config.set("width", "3840").unwrap();
        config.set("engine", "ddg").unwrap();
        config.set("dir", "/srv/cal").unwrap();
        assert_eq!(config.width, 3840);
        assert_eq!(config.engine, SourceEngine::DuckDuckGo);
        assert_eq!(config.calendar_dir, PathBuf::from("/srv/cal"));

        assert!(config.set("height", "0").is_err());
        assert!(config.set("backend", "kde").is_err());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    fn set_relative_dir_resolves_against_home() {
        let mut config = config_from("");
        config.set("dir", "walls").unwrap();
        assert_eq!(config.calendar_dir, PathBuf::from("/home/me/walls"));
    }

    #[test]
    fn toml_round_trips_through_save() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = AppConfig::load(tmp.path(), path.clone());
        config.set("backend", "system").unwrap();
        config.save().unwrap();

        let reloaded = AppConfig::load(tmp.path(), path);
        assert_eq!(reloaded.backend, BackendKind::System);
        assert_eq!(reloaded.calendar_dir, tmp.path().join("calendars"));
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = config_from("[store]\ndir = \"/srv/cal\"\n[desktop]\nbackend = \"gnome\"\n");
        config.apply_env(env(&[("WALLCAL_DIR", "walls"), ("WALLCAL_BACKEND", "system")]));
        assert_eq!(config.calendar_dir, PathBuf::from("/home/me/walls"));
        assert_eq!(config.backend, BackendKind::System);
    }

    #[test]
    fn unknown_env_backend_is_ignored() {
        let mut config = config_from("[desktop]\nbackend = \"gnome\"\n");
        config.apply_env(env(&[("WALLCAL_BACKEND", "kde")]));
        assert_eq!(config.backend, BackendKind::Gnome);
        assert_eq!(config.calendar_dir, PathBuf::from("/home/me/calendars"));
    }

    #[test]
    fn save_keeps_file_values_under_env_override() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[desktop]\nbackend = \"gnome\"\n").unwrap();

        let mut config = AppConfig::load(tmp.path(), path.clone());
        config.apply_env(env(&[("WALLCAL_DIR", "/tmp/elsewhere"), ("WALLCAL_BACKEND", "system")]));
        config.set("width", "2560").unwrap();
        config.save().unwrap();

        let reloaded = AppConfig::load(tmp.path(), path.clone());
        assert_eq!(reloaded.width, 2560);
        assert_eq!(reloaded.backend, BackendKind::Gnome);
        assert_eq!(reloaded.calendar_dir, tmp.path().join("calendars"));

        // 显式 set 的项即使被环境变量覆盖过也照常写入
        config.set("backend", "auto").unwrap();
        config.save().unwrap();
        assert_eq!(AppConfig::load(tmp.path(), path).backend, BackendKind::Auto);
    }

    #[test]
    fn schema_mentions_sections() {
        let schema = AppConfig::get_schema();
        assert!(schema.contains("display"));
        assert!(schema.contains("concurrency"));
    }
}
