//! Monitor configuration management.
//!
//! Configuration is stored as TOML:
//! - `$NOWPLAYING_CONFIG` when set
//! - Linux: `~/.config/nowplaying/config.toml`
//! - Windows: `%APPDATA%/nowplaying/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use encoding_rs::Encoding;
use nowplaying_extract::{
    DEFAULT_EXCEPTIONS, DEFAULT_FILENAME_START, DEFAULT_KNOWN_EXTENSIONS, is_separator,
};
use nowplaying_monitor::Settings;
use nowplaying_publish::Publisher;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "NOWPLAYING_CONFIG";

/// Monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Broadcast automation log to watch.
    #[serde(default = "default_source_path")]
    pub source_path: String,

    /// File receiving the now playing label.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Character offset of the file path in the first log line.
    #[serde(default = "default_filename_start")]
    pub filename_start: usize,

    /// Extensions marking the end of the file path.
    #[serde(default = "default_known_extensions")]
    pub known_extensions: Vec<String>,

    /// Paths containing any of these are never announced.
    #[serde(default = "default_exceptions")]
    pub exceptions: Vec<String>,

    /// Label published when nothing else can be.
    #[serde(default = "default_label")]
    pub default_label: String,

    /// Encoding of the source log (WHATWG label).
    #[serde(default = "default_source_encoding")]
    pub source_encoding: String,

    /// Encoding of the output file (WHATWG label).
    #[serde(default = "default_output_encoding")]
    pub output_encoding: String,

    /// Pause between checks in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Prefix of the console status line.
    #[serde(default = "default_status_prefix")]
    pub status_prefix: String,
}

fn default_source_path() -> String {
    playlists_dir().join("broad.int").to_string_lossy().into_owned()
}

fn default_output_path() -> String {
    playlists_dir().join("broad.txt").to_string_lossy().into_owned()
}

fn default_filename_start() -> usize {
    DEFAULT_FILENAME_START
}

fn default_known_extensions() -> Vec<String> {
    DEFAULT_KNOWN_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_exceptions() -> Vec<String> {
    DEFAULT_EXCEPTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_label() -> String {
    "Radio Muzlo".into()
}

fn default_source_encoding() -> String {
    "windows-1251".into()
}

fn default_output_encoding() -> String {
    "utf-8".into()
}

fn default_poll_interval() -> u64 {
    3
}

fn default_status_prefix() -> String {
    "Now playing: ".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            output_path: default_output_path(),
            filename_start: default_filename_start(),
            known_extensions: default_known_extensions(),
            exceptions: default_exceptions(),
            default_label: default_label(),
            source_encoding: default_source_encoding(),
            output_encoding: default_output_encoding(),
            poll_interval_secs: default_poll_interval(),
            status_prefix: default_status_prefix(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();
        let config = Self::load_from(&path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Loads configuration from `path`, writing the defaults if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "default configuration written");
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Validates the configuration and builds the monitor settings.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        if self.known_extensions.is_empty() {
            bail!("known_extensions must not be empty");
        }
        if self.known_extensions.iter().any(|ext| ext.is_empty()) {
            bail!("known_extensions must not contain empty entries");
        }
        if self.exceptions.iter().any(|exc| exc.is_empty()) {
            bail!("exceptions must not contain empty entries");
        }
        if self.default_label.trim().is_empty() {
            bail!("default_label must not be empty");
        }
        if self.default_label.contains(is_separator) {
            bail!("default_label must not contain path separators");
        }
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be at least 1");
        }

        let source_encoding = resolve_encoding(&self.source_encoding)
            .context("invalid source_encoding")?;
        if !source_encoding.is_ascii_compatible() {
            bail!("source_encoding {} is not ASCII-compatible", source_encoding.name());
        }

        Ok(Settings {
            source_path: PathBuf::from(&self.source_path),
            filename_start: self.filename_start,
            known_extensions: self.known_extensions.clone(),
            exceptions: self.exceptions.clone(),
            default_label: self.default_label.clone(),
            source_encoding,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        })
    }

    /// Validates the output settings and builds the publisher.
    pub fn publisher(&self) -> anyhow::Result<Publisher> {
        let encoding = resolve_encoding(&self.output_encoding)
            .context("invalid output_encoding")?;
        if encoding.output_encoding() != encoding {
            bail!("output_encoding {} cannot be written", encoding.name());
        }
        let (_, _, had_errors) = encoding.encode(&self.default_label);
        if had_errors {
            bail!("default_label is not representable in {}", encoding.name());
        }
        Ok(Publisher::new(&self.output_path, encoding))
    }
}

/// Resolves a WHATWG encoding label such as `cp1251` or `utf-8`.
fn resolve_encoding(label: &str) -> anyhow::Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .with_context(|| format!("unknown encoding {label:?}"))
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("nowplaying").join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("nowplaying")
            .join("config.toml")
    }
}

/// Returns the default playlists directory.
fn playlists_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        PathBuf::from(r"D:\Base\Playlists")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join("Playlists")
    }
}
