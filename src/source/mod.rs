//! Content-fetch collaborators: where magazines and their pages come from.
//!
//! Only published issues are ever handed to the reader. Both sources enforce
//! that themselves so the reader never has to look at a status field.

mod http;
mod local;
mod model;

pub use http::HttpSource;
pub use local::DirectorySource;
pub use model::{MagazineContent, MagazineSummary};

use crate::config::{AppConfig, SourceKind};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("magazine {0} was not found")]
    NotFound(String),
    #[error("magazine {0} is not available")]
    NotAvailable(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("could not decode magazine data: {0}")]
    Decode(String),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait MagazineSource: Send + Sync {
    /// Human-readable origin for logs and the library header.
    fn describe(&self) -> String;

    /// Published issues, newest publish date first.
    fn list(&self) -> Result<Vec<MagazineSummary>, FetchError>;

    /// Pages and title of one published issue.
    fn fetch(&self, id: &str) -> Result<MagazineContent, FetchError>;

    /// `fetch` reporting coarse progress: 50 once the response is in, 80 once
    /// it is decoded.
    fn fetch_with_progress(
        &self,
        id: &str,
        progress: &dyn Fn(u8),
    ) -> Result<MagazineContent, FetchError> {
        let content = self.fetch(id)?;
        progress(80);
        Ok(content)
    }
}

pub fn open_source(config: &AppConfig) -> Result<Arc<dyn MagazineSource>, FetchError> {
    let source: Arc<dyn MagazineSource> = match config.source_kind {
        SourceKind::Http => Arc::new(HttpSource::new(&config.source_base_url)?),
        SourceKind::Directory => Arc::new(DirectorySource::new(&config.source_directory)),
    };
    tracing::info!(kind = %config.source_kind, origin = %source.describe(), "Magazine source ready");
    Ok(source)
}
