//! Flip engine contract.
//!
//! [`FlipEngine`] is the portable part of the book: states, transitions,
//! rebind semantics and typed notifications. [`BookEngine`] is the in-tree
//! implementation; hosts may supply another animation runtime behind the
//! same trait.

mod book;
mod drag;

pub use book::BookEngine;
pub use drag::{DragOutcome, classify_release};

use crate::binder::SurfaceBinding;
use crate::events::EventBus;
use crate::layout::{BookLayout, Orientation, Spread, SurfaceSize};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipState {
    /// Bound to zero pages; navigation is disabled.
    Empty,
    Idle,
    Flipping,
    Dragging,
}

impl std::fmt::Display for FlipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FlipState::Empty => "empty",
            FlipState::Idle => "idle",
            FlipState::Flipping => "flipping",
            FlipState::Dragging => "dragging",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Forward,
    Backward,
}

/// Notifications, delivered in the order the transitions happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipEvent {
    /// First non-empty bind after construction.
    Init {
        index: usize,
        total: usize,
        orientation: Orientation,
    },
    FlipStart {
        from: usize,
        to: usize,
    },
    /// A flip finished; `index` is the new current page.
    Flip {
        index: usize,
    },
    OrientationChange(Orientation),
    StateChange(FlipState),
    /// The engine was rebound to a new page set.
    Update {
        index: usize,
        total: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no mount surface available for the book")]
    MissingSurface,
    #[error("mount surface {width}x{height} cannot host the book")]
    UnusableSurface { width: f32, height: f32 },
}

/// An in-progress page turn as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnFrame {
    pub from: usize,
    pub to: usize,
    pub direction: FlipDirection,
    /// 0.0 at flip start, 1.0 when complete.
    pub progress: f32,
}

/// Everything a renderer needs to draw the book at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipFrame {
    pub state: FlipState,
    pub current: usize,
    pub total: usize,
    pub spread: Spread,
    pub layout: BookLayout,
    pub turn: Option<TurnFrame>,
    /// Horizontal displacement of the page under the pointer (or settling back).
    pub drag_offset: f32,
}

pub trait FlipEngine {
    fn state(&self) -> FlipState;
    fn current_index(&self) -> usize;
    fn page_count(&self) -> usize;
    fn layout(&self) -> BookLayout;
    fn events(&self) -> &EventBus<FlipEvent>;

    /// Each command returns whether a transition was started.
    fn next(&mut self, now: Instant) -> bool;
    fn prev(&mut self, now: Instant) -> bool;
    fn go_to(&mut self, index: usize, now: Instant) -> bool;

    fn pointer_down(&mut self, x: f32, now: Instant) -> bool;
    fn pointer_move(&mut self, x: f32, now: Instant);
    fn pointer_up(&mut self, x: f32, now: Instant);

    /// Advance running animations to `now`.
    fn tick(&mut self, now: Instant);
    fn is_animating(&self) -> bool;

    /// Swap the bound surfaces while keeping engine identity and listeners.
    fn rebind(&mut self, binding: &SurfaceBinding, now: Instant) -> bool;
    fn resize(&mut self, surface: SurfaceSize);

    fn frame(&self, now: Instant) -> FlipFrame;

    /// Close the event bus and drop bound surfaces. Irreversible.
    fn release(&mut self);
    fn is_released(&self) -> bool;
}
