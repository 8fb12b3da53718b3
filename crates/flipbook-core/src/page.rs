//! Page descriptors and the registry that holds the ordered page set.
//!
//! The registry mirrors whatever the content collaborator hands over. It is
//! only ever replaced wholesale, and it re-sorts on every replacement so the
//! reader never depends on upstream ordering.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Minimal page record consumed by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    /// 1-based position within the magazine.
    pub page_number: u32,
    pub image_url: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl Page {
    pub fn new(id: impl Into<String>, page_number: u32, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page_number,
            image_url: image_url.into(),
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Caption text, treating blank strings like a missing caption.
    pub fn caption(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Ordered page set owned by one reader mount.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: Vec<Page>,
    revision: u64,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry contents, sorting ascending by `page_number`.
    pub fn set_pages(&mut self, mut pages: Vec<Page>) {
        pages.sort_by_key(|page| page.page_number);
        report_sequence_gaps(&pages);
        self.pages = pages;
        self.revision = self.revision.wrapping_add(1);
        debug!(
            total = self.pages.len(),
            revision = self.revision,
            "Page registry replaced"
        );
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Bumped on every replacement, including replacement with equal contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

// Missing pages are never synthesized; we only make the gap visible in logs.
fn report_sequence_gaps(pages: &[Page]) {
    for pair in pages.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.page_number == next.page_number {
            warn!(
                page_number = next.page_number,
                first = %prev.id,
                second = %next.id,
                "Duplicate page number in page set"
            );
        } else if next.page_number != prev.page_number + 1 {
            warn!(
                after = prev.page_number,
                before = next.page_number,
                "Gap in page numbering"
            );
        }
    }
    if let Some(first) = pages.first() {
        if first.page_number != 1 {
            warn!(first = first.page_number, "Page numbering does not start at 1");
        }
    }
}
