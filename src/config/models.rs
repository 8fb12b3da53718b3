use flipbook_core::ReaderOptions;
use serde::Deserialize;

/// High-level app configuration, flattened from the TOML tables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub reader: ReaderOptions,
    pub window_width: f32,
    pub window_height: f32,
    pub source_kind: SourceKind,
    pub source_base_url: String,
    pub source_directory: String,
    pub key_next_page: String,
    pub key_prev_page: String,
    pub key_first_page: String,
    pub key_library: String,
    pub key_quit: String,
    pub cache_dir: String,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            reader: crate::config::defaults::default_reader(),
            window_width: crate::config::defaults::default_window_width(),
            window_height: crate::config::defaults::default_window_height(),
            source_kind: crate::config::defaults::default_source_kind(),
            source_base_url: crate::config::defaults::default_base_url(),
            source_directory: crate::config::defaults::default_magazine_dir(),
            key_next_page: crate::config::defaults::default_key_next_page(),
            key_prev_page: crate::config::defaults::default_key_prev_page(),
            key_first_page: crate::config::defaults::default_key_first_page(),
            key_library: crate::config::defaults::default_key_library(),
            key_quit: crate::config::defaults::default_key_quit(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

/// Where magazines come from.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The publishing site's public API.
    Http,
    /// A folder of `<id>.json` magazine files.
    Directory,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SourceKind::Http => "http",
            SourceKind::Directory => "directory",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Default, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
