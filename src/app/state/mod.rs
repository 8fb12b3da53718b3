mod library;
mod reading;

pub(in crate::app) use library::LibraryState;
pub(in crate::app) use reading::ReadingState;

use super::messages::Message;
use super::update::Effect;
use crate::cache::ImageCache;
use crate::config::AppConfig;
use crate::source::MagazineSource;
use flipbook_core::{KeyboardHub, SurfaceSize};
use iced::Task;
use std::sync::Arc;

/// Space taken by the title bar, the controls row and padding around the book.
pub(crate) const READER_CHROME_WIDTH: f32 = 48.0;
pub(crate) const READER_CHROME_HEIGHT: f32 = 170.0;

pub(in crate::app) enum Screen {
    Library,
    Loading { id: String, percent: u8 },
    Reading(Box<ReadingState>),
    Failed { id: String, message: String },
}

/// Core application state.
pub struct App {
    pub(super) config: AppConfig,
    pub(super) source: Arc<dyn MagazineSource>,
    pub(super) cache: Arc<ImageCache>,
    pub(super) keys: KeyboardHub,
    pub(super) window_width: f32,
    pub(super) window_height: f32,
    pub(super) library: LibraryState,
    pub(super) screen: Screen,
    pub(super) mount_serial: u64,
}

impl App {
    pub(super) fn bootstrap(
        config: AppConfig,
        source: Arc<dyn MagazineSource>,
        cache: ImageCache,
        initial: Option<String>,
    ) -> (App, Task<Message>) {
        let mut app = App {
            window_width: config.window_width,
            window_height: config.window_height,
            config,
            source,
            cache: Arc::new(cache),
            keys: KeyboardHub::new(),
            library: LibraryState::default(),
            screen: Screen::Library,
            mount_serial: 0,
        };
        let mut effects = vec![Effect::LoadLibrary];
        if let Some(id) = initial {
            effects.extend(app.reduce(Message::OpenMagazine(id)));
        }
        app.library.loading = true;
        let task = Task::batch(effects.into_iter().map(|effect| app.run_effect(effect)));
        (app, task)
    }

    /// Area the book may occupy inside the current window.
    pub(super) fn reader_surface(&self) -> SurfaceSize {
        SurfaceSize::new(
            (self.window_width - READER_CHROME_WIDTH).max(0.0),
            (self.window_height - READER_CHROME_HEIGHT).max(0.0),
        )
    }

    pub(super) fn reading(&self) -> Option<&ReadingState> {
        match &self.screen {
            Screen::Reading(reading) => Some(reading),
            _ => None,
        }
    }

    pub(super) fn reading_mut(&mut self) -> Option<&mut ReadingState> {
        match &mut self.screen {
            Screen::Reading(reading) => Some(reading),
            _ => None,
        }
    }

    /// Leave the current screen, unmounting the reader if one is mounted.
    pub(super) fn replace_screen(&mut self, next: Screen) {
        if let Screen::Reading(reading) = std::mem::replace(&mut self.screen, next) {
            reading.unmount();
        }
    }
}
