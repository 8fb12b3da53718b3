use super::model::{Magazine, MagazineContent, MagazineSummary, sort_newest_first};
use super::{FetchError, MagazineSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reads `<id>.json` magazine files from one directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_magazine(&self, path: &Path) -> Result<Magazine, FetchError> {
        let data = fs::read(path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|err| FetchError::Decode(err.to_string()))
    }

    fn resolve_image(&self, reference: &str) -> String {
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return reference.to_string();
        }
        let path = Path::new(reference);
        if path.is_absolute() && path.exists() {
            return reference.to_string();
        }
        // Site-style "/uploads/.." references are relative to the issue folder.
        self.root
            .join(reference.trim_start_matches('/'))
            .to_string_lossy()
            .into_owned()
    }
}

impl MagazineSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn list(&self) -> Result<Vec<MagazineSummary>, FetchError> {
        let entries = fs::read_dir(&self.root).map_err(|source| FetchError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match self.read_magazine(&path) {
                Ok(magazine) if magazine.is_published() => {
                    let mut summary = magazine.summary();
                    summary.cover_image = summary
                        .cover_image
                        .map(|cover| self.resolve_image(&cover));
                    summaries.push(summary);
                }
                Ok(_) => {}
                Err(err) => warn!(path = %path.display(), "Skipping unreadable magazine: {err}"),
            }
        }
        sort_newest_first(&mut summaries);
        info!(count = summaries.len(), root = %self.root.display(), "Listed magazines");
        Ok(summaries)
    }

    fn fetch(&self, id: &str) -> Result<MagazineContent, FetchError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(FetchError::NotFound(id.to_string()));
        }
        let path = self.root.join(format!("{id}.json"));
        if !path.is_file() {
            return Err(FetchError::NotFound(id.to_string()));
        }
        let mut magazine = self.read_magazine(&path)?;
        if !magazine.is_published() {
            return Err(FetchError::NotAvailable(id.to_string()));
        }
        for page in &mut magazine.pages {
            page.image_url = self.resolve_image(&page.image_url);
        }
        info!(id, pages = magazine.pages.len(), "Loaded magazine from disk");
        Ok(magazine.into_content())
    }
}
