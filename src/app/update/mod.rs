use flipbook_core::{ImageSource, PageHandle};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

mod core;
mod navigation;

/// Describes work that must be performed outside the pure reducer.
pub(super) enum Effect {
    LoadLibrary,
    FetchMagazine(String),
    LoadImages {
        mount: u64,
        jobs: Vec<ImageJob>,
        /// Set once the mount is left; deferred loads stop at the next page.
        cancel: Arc<AtomicBool>,
    },
    Quit,
}

pub(super) struct ImageJob {
    pub(super) handle: PageHandle,
    pub(super) source: ImageSource,
    pub(super) eager: bool,
}
