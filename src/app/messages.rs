use crate::source::{MagazineContent, MagazineSummary};
use flipbook_core::{NavIntent, PageHandle};
use iced::Point;
use iced::keyboard::{Key, Modifiers};
use iced::widget::image;
use std::time::Instant;

/// Messages emitted by the UI and by background work.
#[derive(Debug, Clone)]
pub enum Message {
    RefreshLibrary,
    LibraryLoaded(Result<Vec<MagazineSummary>, String>),
    FilterChanged(String),
    SortBy(SortColumn),
    OpenMagazine(String),
    LoadProgress {
        id: String,
        percent: u8,
    },
    MagazineFetched {
        id: String,
        result: Result<MagazineContent, String>,
    },
    BackToLibrary,
    Navigate(NavIntent),
    PointerMoved(Point),
    PointerPressed,
    PointerReleased,
    ImageLoaded {
        mount: u64,
        handle: PageHandle,
        result: Result<image::Handle, String>,
    },
    WindowResized {
        width: f32,
        height: f32,
    },
    KeyPressed {
        key: Key,
        modifiers: Modifiers,
    },
    Tick(Instant),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Title,
    PublishDate,
}
