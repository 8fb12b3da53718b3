use flipbook_core::{FlipbookReader, PageHandle, Subscription};
use iced::widget::image;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A mounted magazine.
pub struct ReadingState {
    pub(in crate::app) id: String,
    /// Distinguishes image results of this mount from those of earlier ones.
    pub(in crate::app) mount: u64,
    pub(in crate::app) reader: FlipbookReader,
    pub(in crate::app) images: HashMap<PageHandle, image::Handle>,
    pub(in crate::app) pointer_x: f32,
    pub(in crate::app) pointer_down: bool,
    /// Shared with this mount's background image loads.
    pub(in crate::app) loads_cancelled: Arc<AtomicBool>,
    pub(in crate::app) _hook: Subscription,
}

impl ReadingState {
    pub(in crate::app) fn unmount(self) {
        self.loads_cancelled.store(true, Ordering::Relaxed);
        self.reader.unmount();
    }
}
