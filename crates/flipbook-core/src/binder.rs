//! Render surface binding.
//!
//! Every call to [`RenderSurfaceBinder::bind`] produces a fresh
//! [`SurfaceBinding`] stamped with a new generation. Handles carry that
//! generation so a handle from a discarded binding can never address a
//! surface of the current one.

use crate::page::Page;
use tracing::{debug, warn};

/// Number of leading pages flagged for eager image loading.
pub const EAGER_PAGES: usize = 2;

/// Identifies one mounted page surface within one binding generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle {
    pub generation: u64,
    pub slot: usize,
}

/// Where a page image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Remote(String),
    Local(String),
}

impl ImageSource {
    pub fn classify(reference: &str) -> Self {
        let trimmed = reference.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Remote(trimmed.to_string())
        } else {
            ImageSource::Local(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Remote(url) => url,
            ImageSource::Local(path) => path,
        }
    }
}

/// Per-page image load state, tracked at the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageLoad {
    #[default]
    Pending,
    Ready,
    /// Render the broken-image fallback for this page only.
    Failed,
}

/// One renderable unit, index-aligned with the page list it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurface {
    pub handle: PageHandle,
    pub page_id: String,
    pub page_number: u32,
    pub image: ImageSource,
    pub caption: Option<String>,
    pub alt: String,
    pub eager: bool,
    pub load: ImageLoad,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceBinding {
    generation: u64,
    surfaces: Vec<PageSurface>,
}

impl SurfaceBinding {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn surfaces(&self) -> &[PageSurface] {
        &self.surfaces
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn handles(&self) -> Vec<PageHandle> {
        self.surfaces.iter().map(|surface| surface.handle).collect()
    }

    pub fn surface(&self, index: usize) -> Option<&PageSurface> {
        self.surfaces.get(index)
    }

    fn resolve_mut(&mut self, handle: PageHandle) -> Option<&mut PageSurface> {
        if handle.generation != self.generation {
            return None;
        }
        self.surfaces.get_mut(handle.slot)
    }

    /// Record an image outcome. Returns false for handles of another generation.
    pub fn set_image_load(&mut self, handle: PageHandle, load: ImageLoad) -> bool {
        match self.resolve_mut(handle) {
            Some(surface) => {
                if load == ImageLoad::Failed {
                    warn!(
                        page = surface.page_number,
                        image = surface.image.as_str(),
                        "Page image failed to load; showing fallback"
                    );
                }
                surface.load = load;
                true
            }
            None => {
                debug!(?handle, current = self.generation, "Ignoring stale page handle");
                false
            }
        }
    }
}

/// Builds page surfaces for the flip engine.
#[derive(Debug, Default)]
pub struct RenderSurfaceBinder {
    generation: u64,
}

impl RenderSurfaceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the previous generation and build a fresh binding.
    pub fn bind(&mut self, pages: &[Page]) -> SurfaceBinding {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let surfaces = pages
            .iter()
            .enumerate()
            .map(|(slot, page)| PageSurface {
                handle: PageHandle { generation, slot },
                page_id: page.id.clone(),
                page_number: page.page_number,
                image: ImageSource::classify(&page.image_url),
                caption: page.caption().map(str::to_string),
                alt: format!("Page {}", page.page_number),
                eager: slot < EAGER_PAGES,
                load: ImageLoad::Pending,
            })
            .collect::<Vec<_>>();
        debug!(generation, surfaces = surfaces.len(), "Bound page surfaces");
        SurfaceBinding {
            generation,
            surfaces,
        }
    }

    pub fn is_current(&self, binding: &SurfaceBinding) -> bool {
        binding.generation == self.generation
    }
}
