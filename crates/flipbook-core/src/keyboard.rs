//! Window-level keyboard events with scoped listener registration.
//!
//! The host owns one [`KeyboardHub`] per window and forwards key presses into
//! it. A reader attaches a listener on mount and holds the returned
//! [`KeyListenerGuard`]; the listener is gone as soon as the guard drops, on
//! every unmount path.

use crate::events::{EventBus, Subscription};
use std::time::Instant;
use tracing::trace;

/// Keys the reader understands once host shortcuts have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: NavKey,
    pub at: Instant,
}

#[derive(Clone, Default)]
pub struct KeyboardHub {
    bus: EventBus<KeyPress>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&self, handler: impl Fn(&KeyPress) + 'static) -> KeyListenerGuard {
        KeyListenerGuard {
            _subscription: self.bus.subscribe(handler),
        }
    }

    pub fn dispatch(&self, key: NavKey, at: Instant) {
        trace!(?key, listeners = self.listener_count(), "Dispatching window key");
        self.bus.emit(KeyPress { key, at });
    }

    pub fn listener_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

/// Keeps a key listener attached; dropping it detaches the listener.
#[derive(Debug)]
pub struct KeyListenerGuard {
    _subscription: Subscription,
}
