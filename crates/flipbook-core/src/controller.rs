//! Navigation controller: user intents in, mirrored engine state out.
//!
//! The mirror is only written by engine notifications. Rendering reads the
//! mirror and never queries the engine, so the UI cannot drift from the
//! order in which flips actually completed.

use crate::engine::{FlipEngine, FlipEvent, FlipState};
use crate::events::Subscription;
use crate::keyboard::{KeyListenerGuard, KeyboardHub, NavKey};
use crate::layout::Orientation;
use crate::pagination::{PageLink, visible_page_links};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;
use tracing::{debug, warn};

pub type SharedEngine = Rc<RefCell<dyn FlipEngine>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Prev,
    /// "Return to start".
    First,
    Last,
    /// A click on a 1-based page number in the strip.
    PageNumber(usize),
}

impl NavIntent {
    pub fn from_key(key: NavKey) -> Self {
        match key {
            NavKey::ArrowRight => NavIntent::Next,
            NavKey::ArrowLeft => NavIntent::Prev,
            NavKey::Home => NavIntent::First,
            NavKey::End => NavIntent::Last,
        }
    }
}

/// Engine state as last reported through events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavMirror {
    pub current_index: usize,
    pub total_pages: usize,
    pub state: FlipState,
    pub orientation: Option<Orientation>,
}

impl NavMirror {
    pub fn is_flipping(&self) -> bool {
        matches!(self.state, FlipState::Flipping | FlipState::Dragging)
    }

    fn apply(&mut self, event: &FlipEvent) {
        match *event {
            FlipEvent::Init {
                index,
                total,
                orientation,
            } => {
                self.current_index = index;
                self.total_pages = total;
                self.orientation = Some(orientation);
            }
            FlipEvent::Update { index, total } => {
                self.current_index = index;
                self.total_pages = total;
            }
            FlipEvent::Flip { index } => self.current_index = index,
            FlipEvent::StateChange(state) => self.state = state,
            FlipEvent::OrientationChange(orientation) => self.orientation = Some(orientation),
            FlipEvent::FlipStart { .. } => {}
        }
    }
}

/// Button and strip affordances derived from the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView {
    pub prev_enabled: bool,
    pub first_enabled: bool,
    pub next_enabled: bool,
    pub links: Vec<PageLink>,
    pub label: String,
    pub is_flipping: bool,
}

impl ControlsView {
    /// Controls for a reader that has nothing to navigate.
    pub fn disabled() -> Self {
        Self {
            prev_enabled: false,
            first_enabled: false,
            next_enabled: false,
            links: Vec::new(),
            label: "No pages".to_string(),
            is_flipping: false,
        }
    }
}

pub struct NavigationController {
    engine: SharedEngine,
    mirror: Rc<RefCell<NavMirror>>,
    radius: usize,
    _subscription: Subscription,
}

impl NavigationController {
    pub fn new(engine: SharedEngine, radius: usize) -> Self {
        let initial = {
            let engine = engine.borrow();
            NavMirror {
                current_index: engine.current_index(),
                total_pages: engine.page_count(),
                state: engine.state(),
                orientation: Some(engine.layout().orientation),
            }
        };
        let mirror = Rc::new(RefCell::new(initial));
        let sink = Rc::clone(&mirror);
        let subscription = engine
            .borrow()
            .events()
            .subscribe(move |event| sink.borrow_mut().apply(event));
        Self {
            engine,
            mirror,
            radius,
            _subscription: subscription,
        }
    }

    pub fn dispatch(&self, intent: NavIntent, now: Instant) -> bool {
        dispatch_to(&self.engine, intent, now)
    }

    /// Attach a window key listener that drives this controller's engine.
    pub fn attach_keyboard(&self, hub: &KeyboardHub) -> KeyListenerGuard {
        let weak: Weak<RefCell<dyn FlipEngine>> = Rc::downgrade(&self.engine);
        hub.listen(move |press| {
            if let Some(engine) = weak.upgrade() {
                dispatch_to(&engine, NavIntent::from_key(press.key), press.at);
            }
        })
    }

    pub fn mirror(&self) -> NavMirror {
        *self.mirror.borrow()
    }

    pub fn controls(&self) -> ControlsView {
        let mirror = self.mirror();
        if mirror.total_pages == 0 || mirror.state == FlipState::Empty {
            return ControlsView::disabled();
        }
        let busy = mirror.is_flipping();
        let at_start = mirror.current_index == 0;
        let at_end = mirror.current_index + 1 >= mirror.total_pages;
        ControlsView {
            prev_enabled: !busy && !at_start,
            first_enabled: !busy && !at_start,
            next_enabled: !busy && !at_end,
            links: visible_page_links(mirror.current_index, mirror.total_pages, self.radius),
            label: format!("Page {} of {}", mirror.current_index + 1, mirror.total_pages),
            is_flipping: busy,
        }
    }
}

fn dispatch_to(engine: &RefCell<dyn FlipEngine>, intent: NavIntent, now: Instant) -> bool {
    let Ok(mut engine) = engine.try_borrow_mut() else {
        warn!(?intent, "Navigation requested while the engine is busy; dropped");
        return false;
    };
    let started = match intent {
        NavIntent::Next => engine.next(now),
        NavIntent::Prev => engine.prev(now),
        NavIntent::First => engine.go_to(0, now),
        NavIntent::Last => {
            let last = engine.page_count().saturating_sub(1);
            engine.go_to(last, now)
        }
        NavIntent::PageNumber(number) => match number.checked_sub(1) {
            Some(index) => engine.go_to(index, now),
            None => false,
        },
    };
    debug!(?intent, started, "Navigation intent handled");
    started
}
