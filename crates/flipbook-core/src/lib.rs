//! Paginated, flippable magazine reader core.
//!
//! Pages flow from the [`page::PageRegistry`] through the
//! [`binder::RenderSurfaceBinder`] into a [`engine::FlipEngine`], and the
//! [`controller::NavigationController`] mirrors engine notifications back to
//! the visible controls. [`reader::FlipbookReader`] owns all of them for one
//! mount.

pub mod binder;
pub mod controller;
pub mod engine;
pub mod events;
pub mod keyboard;
pub mod layout;
pub mod options;
pub mod page;
pub mod pagination;
pub mod reader;

pub use binder::{ImageLoad, ImageSource, PageHandle, PageSurface};
pub use controller::{ControlsView, NavIntent};
pub use engine::{EngineError, FlipDirection, FlipEvent, FlipFrame, FlipState};
pub use events::Subscription;
pub use keyboard::{KeyboardHub, NavKey};
pub use layout::{Orientation, Spread, SurfaceSize};
pub use options::{ReaderOptions, SizeMode};
pub use page::Page;
pub use pagination::PageLink;
pub use reader::{FlipbookReader, ReaderProps, ReaderView};
