//! Entry point for the magazine reader.
//!
//! - Parse command-line arguments.
//! - Load user configuration (`conf/config.toml` unless `--config` is given).
//! - Open the configured magazine source and image cache.
//! - Launch the GUI, optionally straight into one magazine.
//!
//! `--write-default-config` writes the default tables to the config path and
//! exits without starting the GUI.

mod app;
mod cache;
mod config;
mod source;

use crate::app::run_app;
use crate::cache::ImageCache;
use crate::config::{AppConfig, load_config, serialize_config};
use crate::source::open_source;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const USAGE: &str =
    "Usage: magazine-reader [--config <path>] [--write-default-config] [<magazine-id>]";

#[derive(Debug, PartialEq)]
struct CliArgs {
    config_path: PathBuf,
    magazine_id: Option<String>,
    write_default_config: bool,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args_from(env::args().skip(1))?;
    if args.write_default_config {
        write_default_config(&args.config_path)?;
        info!(path = %args.config_path.display(), "Wrote default config");
        return Ok(());
    }
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        config = %args.config_path.display(),
        level = %config.log_level,
        source = %config.source_kind,
        "Starting magazine reader"
    );

    let source = open_source(&config).context("Failed to open the magazine source")?;
    let cache = ImageCache::new(&config.cache_dir).context("Failed to prepare the image cache")?;
    if let Some(id) = &args.magazine_id {
        info!(%id, "Opening magazine from the command line");
    }

    run_app(config, source, cache, args.magazine_id).context("Failed to start the GUI")?;
    Ok(())
}

fn parse_args_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut magazine_id = None;
    let mut write_default_config = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args
                .next()
                .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
            config_path = PathBuf::from(path);
        } else if let Some(path) = arg.strip_prefix("--config=") {
            if path.is_empty() {
                return Err(anyhow!("--config needs a path\n{USAGE}"));
            }
            config_path = PathBuf::from(path);
        } else if arg == "--write-default-config" {
            write_default_config = true;
        } else if arg == "-h" || arg == "--help" {
            return Err(anyhow!(USAGE));
        } else if arg.starts_with('-') {
            return Err(anyhow!("Unknown option {arg}\n{USAGE}"));
        } else if magazine_id.is_none() {
            magazine_id = Some(arg);
        } else {
            return Err(anyhow!("Only one magazine id may be given\n{USAGE}"));
        }
    }

    Ok(CliArgs {
        config_path,
        magazine_id,
        write_default_config,
    })
}

/// Refuses to replace an existing file.
fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(anyhow!("{} already exists; not overwriting it", path.display()));
    }
    let text = serialize_config(&AppConfig::default()).context("Failed to serialize defaults")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with [logging] level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
