// backend.rs — 系统桌面背景接口
// 两种实现：GNOME 的 gsettings，以及 wallpaper 库（Windows 注册表 / macOS / 其他桌面）
// 启动时选定一种，之后只通过 DesktopBackground trait 使用

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use url::Url;

/// 读取 / 设置桌面背景的能力
pub trait DesktopBackground {
    /// 后端名称，用于日志
    fn name(&self) -> &'static str;

    /// 当前背景图片路径；系统没有设置或不是本地文件时返回 `None`
    fn current(&self) -> Result<Option<PathBuf>>;

    /// 将指定图片设为背景
    fn set(&self, path: &Path) -> Result<()>;
}

/// 配置文件中的后端选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 根据桌面环境自动选择
    #[default]
    Auto,
    /// GNOME gsettings
    Gnome,
    /// wallpaper 库
    System,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "gnome" | "gsettings" => Some(Self::Gnome),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Gnome => "gnome",
            Self::System => "system",
        }
    }

    /// 把 Auto 落实为具体后端
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => {
                let desktop = std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_default();
                if cfg!(target_os = "linux") && desktop.to_uppercase().contains("GNOME") {
                    Self::Gnome
                } else {
                    Self::System
                }
            }
            other => other,
        }
    }
}

/// 根据配置创建后端实例
pub fn select(kind: BackendKind) -> Box<dyn DesktopBackground> {
    match kind.resolve() {
        BackendKind::Gnome => Box::new(GnomeSettings::new()),
        _ => Box::new(SystemWallpaper),
    }
}

// ---------------------------------------------------------------------------
// GNOME
// ---------------------------------------------------------------------------

const SCHEMA: &str = "org.gnome.desktop.background";

/// 通过 `gsettings` 读写 GNOME 背景
pub struct GnomeSettings {
    /// cron 中运行时没有会话总线地址，需要从用户会话进程里找出来
    bus_address: Option<String>,
}

impl GnomeSettings {
    pub fn new() -> Self {
        let bus_address = if std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some() {
            None
        } else {
            discover_bus_address()
        };
        Self { bus_address }
    }

    fn gsettings(&self) -> Command {
        let mut cmd = Command::new("gsettings");
        if let Some(address) = &self.bus_address {
            cmd.env("DBUS_SESSION_BUS_ADDRESS", address);
        }
        cmd
    }
}

impl Default for GnomeSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopBackground for GnomeSettings {
    fn name(&self) -> &'static str {
        "gnome"
    }

    fn current(&self) -> Result<Option<PathBuf>> {
        let output = self
            .gsettings()
            .args(["get", SCHEMA, "picture-uri"])
            .output()
            .map_err(|e| Error::backend("gnome", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::backend("gnome", stderr.trim()));
        }

        Ok(parse_picture_uri(&String::from_utf8_lossy(&output.stdout)))
    }

    fn set(&self, path: &Path) -> Result<()> {
        let uri = Url::from_file_path(path)
            .map_err(|_| Error::backend("gnome", format!("not an absolute path: {}", path.display())))?
            .to_string();

        let status = self
            .gsettings()
            .args(["set", SCHEMA, "picture-uri", &uri])
            .status()
            .map_err(|e| Error::backend("gnome", e))?;
        if !status.success() {
            return Err(Error::backend("gnome", format!("gsettings exited with {status}")));
        }

        // 旧版 GNOME 没有这个键
        match self
            .gsettings()
            .args(["set", SCHEMA, "picture-uri-dark", &uri])
            .status()
        {
            Ok(status) if status.success() => {}
            other => tracing::debug!(?other, "picture-uri-dark not updated"),
        }

        Ok(())
    }
}

/// 解析 `gsettings get` 的输出，例如 `'file:///home/me/calendars/a.png'`
pub fn parse_picture_uri(raw: &str) -> Option<PathBuf> {
    let uri = raw.trim().trim_matches('\'').trim_matches('"');
    if uri.is_empty() {
        return None;
    }
    Url::parse(uri).ok()?.to_file_path().ok()
}

/// 从 gnome-session / gnome-shell 进程的环境变量里取出会话总线地址
fn discover_bus_address() -> Option<String> {
    for process in ["gnome-session", "gnome-shell"] {
        let output = match Command::new("pgrep").arg(process).output() {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "pgrep unavailable");
                return None;
            }
        };

        for pid in String::from_utf8_lossy(&output.stdout).split_whitespace() {
            let Ok(environ) = std::fs::read(format!("/proc/{pid}/environ")) else {
                continue;
            };
            if let Some(address) = bus_address_from_environ(&environ) {
                tracing::debug!(pid, process, "found session bus address");
                return Some(address);
            }
        }
    }
    None
}

/// `/proc/<pid>/environ` 以 `\0` 分隔
fn bus_address_from_environ(environ: &[u8]) -> Option<String> {
    environ
        .split(|b| *b == 0)
        .filter_map(|entry| std::str::from_utf8(entry).ok())
        .find_map(|entry| entry.strip_prefix("DBUS_SESSION_BUS_ADDRESS="))
        .filter(|address| !address.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// wallpaper 库
// ---------------------------------------------------------------------------

/// 调用 wallpaper 库，它会自动识别操作系统并调用相应的 API
pub struct SystemWallpaper;

impl DesktopBackground for SystemWallpaper {
    fn name(&self) -> &'static str {
        "system"
    }

    fn current(&self) -> Result<Option<PathBuf>> {
        let current = wallpaper::get().map_err(|e| Error::backend("system", e))?;
        let current = current.trim();
        if current.is_empty() {
            return Ok(None);
        }
        // 部分桌面返回 file:// URI
        Ok(parse_picture_uri(current).or_else(|| Some(PathBuf::from(current))))
    }

    fn set(&self, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::backend("system", format!("non UTF-8 path: {}", path.display())))?;
        wallpaper::set_from_path(path_str).map_err(|e| Error::backend("system", e))
    }
}
