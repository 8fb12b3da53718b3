use super::defaults;
use super::models::{AppConfig, LogLevel, SourceKind};
use flipbook_core::ReaderOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default = "defaults::default_reader")]
    reader: ReaderOptions,
    #[serde(default)]
    window: WindowConfig,
    #[serde(default)]
    source: SourceConfig,
    #[serde(default)]
    keys: KeysConfig,
    #[serde(default)]
    cache: CacheConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            reader: tables.reader.sanitized(),
            window_width: tables.window.width,
            window_height: tables.window.height,
            source_kind: tables.source.kind,
            source_base_url: tables.source.base_url,
            source_directory: tables.source.directory,
            key_next_page: tables.keys.next_page,
            key_prev_page: tables.keys.prev_page,
            key_first_page: tables.keys.first_page,
            key_library: tables.keys.library,
            key_quit: tables.keys.quit,
            cache_dir: tables.cache.dir,
            log_level: tables.logging.level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            reader: config.reader.clone(),
            window: WindowConfig {
                width: config.window_width,
                height: config.window_height,
            },
            source: SourceConfig {
                kind: config.source_kind,
                base_url: config.source_base_url.clone(),
                directory: config.source_directory.clone(),
            },
            keys: KeysConfig {
                next_page: config.key_next_page.clone(),
                prev_page: config.key_prev_page.clone(),
                first_page: config.key_first_page.clone(),
                library: config.key_library.clone(),
                quit: config.key_quit.clone(),
            },
            cache: CacheConfig {
                dir: config.cache_dir.clone(),
            },
            logging: LoggingConfig {
                level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct WindowConfig {
    #[serde(default = "defaults::default_window_width")]
    width: f32,
    #[serde(default = "defaults::default_window_height")]
    height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: defaults::default_window_width(),
            height: defaults::default_window_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SourceConfig {
    #[serde(default = "defaults::default_source_kind")]
    kind: SourceKind,
    #[serde(default = "defaults::default_base_url")]
    base_url: String,
    #[serde(default = "defaults::default_magazine_dir")]
    directory: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            kind: defaults::default_source_kind(),
            base_url: defaults::default_base_url(),
            directory: defaults::default_magazine_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct KeysConfig {
    #[serde(default = "defaults::default_key_next_page")]
    next_page: String,
    #[serde(default = "defaults::default_key_prev_page")]
    prev_page: String,
    #[serde(default = "defaults::default_key_first_page")]
    first_page: String,
    #[serde(default = "defaults::default_key_library")]
    library: String,
    #[serde(default = "defaults::default_key_quit")]
    quit: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        KeysConfig {
            next_page: defaults::default_key_next_page(),
            prev_page: defaults::default_key_prev_page(),
            first_page: defaults::default_key_first_page(),
            library: defaults::default_key_library(),
            quit: defaults::default_key_quit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct CacheConfig {
    #[serde(default = "defaults::default_cache_dir")]
    dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            dir: defaults::default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: defaults::default_log_level(),
        }
    }
}
