//! Page image cache.
//!
//! Remote page images are downloaded once and stored under
//! `<cache dir>/images/` using a hash of the URL as the filename. Local images
//! are read in place. Every image is decoded once before it is handed to the
//! renderer, so a corrupt file only ever breaks its own page.

use anyhow::{Context, Result, anyhow};
use flipbook_core::ImageSource;
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub fn hash_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn image_path(cache_dir: &Path, url: &str) -> PathBuf {
    cache_dir.join("images").join(hash_key(url))
}

/// Decode `bytes` and return the image dimensions.
pub fn validate_image(bytes: &[u8]) -> Result<(u32, u32)> {
    let decoded = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Unable to sniff image format")?
        .decode()
        .context("Unable to decode image")?;
    Ok((decoded.width(), decoded.height()))
}

pub struct ImageCache {
    dir: PathBuf,
    client: Client,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .context("Failed to build image download client")?;
        Ok(Self {
            dir: dir.into(),
            client,
        })
    }

    /// Bytes for one page image, validated.
    pub fn load(&self, source: &ImageSource) -> Result<Vec<u8>> {
        match source {
            ImageSource::Local(path) => {
                let bytes = fs::read(path).with_context(|| format!("Failed to read {path}"))?;
                validate_image(&bytes).with_context(|| format!("Broken image at {path}"))?;
                Ok(bytes)
            }
            ImageSource::Remote(url) => self.load_remote(url),
        }
    }

    fn load_remote(&self, url: &str) -> Result<Vec<u8>> {
        let cached = image_path(&self.dir, url);
        if let Ok(bytes) = fs::read(&cached) {
            if validate_image(&bytes).is_ok() {
                debug!(%url, "Page image served from cache");
                return Ok(bytes);
            }
            warn!(path = %cached.display(), "Discarding corrupt cached image");
            let _ = fs::remove_file(&cached);
        }

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to download {url}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Download of {url} answered {status}"));
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read body of {url}"))?
            .to_vec();
        validate_image(&bytes).with_context(|| format!("Broken image at {url}"))?;
        self.store(&cached, &bytes);
        Ok(bytes)
    }

    /// Write errors are logged and ignored; the bytes are still usable.
    fn store(&self, path: &Path, bytes: &[u8]) {
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), "Unable to create image cache dir: {err}");
                return;
            }
        }
        if let Err(err) = fs::write(path, bytes) {
            warn!(path = %path.display(), "Unable to cache page image: {err}");
        }
    }
}
