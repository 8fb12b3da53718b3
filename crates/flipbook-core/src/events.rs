//! Typed observer bus used for engine notifications and window key events.
//!
//! Handlers are registered with [`EventBus::subscribe`] and stay registered
//! for as long as the returned [`Subscription`] lives. Events emitted from
//! inside a handler are queued and delivered after the current event has
//! reached every handler, so all handlers observe the same order.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct Entry<E> {
    id: u64,
    active: Rc<Cell<bool>>,
    handler: Handler<E>,
}

struct Inner<E> {
    entries: RefCell<Vec<Entry<E>>>,
    queue: RefCell<VecDeque<E>>,
    dispatching: Cell<bool>,
    closed: Cell<bool>,
    next_id: Cell<u64>,
}

/// Single-threaded event bus. Cloning yields another handle to the same bus.
pub struct EventBus<E> {
    inner: Rc<Inner<E>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                entries: RefCell::new(Vec::new()),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
                closed: Cell::new(false),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        if self.inner.closed.get() {
            return Subscription::detached();
        }
        let active = Rc::new(Cell::new(true));
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push(Entry {
            id,
            active: Rc::clone(&active),
            handler: Rc::new(handler),
        });

        let weak: Weak<Inner<E>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                active.set(false);
                if let Some(inner) = weak.upgrade() {
                    let removed = {
                        let mut entries = inner.entries.borrow_mut();
                        entries
                            .iter()
                            .position(|entry| entry.id == id)
                            .map(|index| entries.remove(index))
                    };
                    // Handlers may own subscriptions of their own; drop them
                    // once the entry list is no longer borrowed.
                    drop(removed);
                }
            })),
        }
    }

    pub fn emit(&self, event: E) {
        if self.inner.closed.get() {
            return;
        }
        self.inner.queue.borrow_mut().push_back(event);
        if self.inner.dispatching.replace(true) {
            return;
        }
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };
            let targets: Vec<(Rc<Cell<bool>>, Handler<E>)> = self
                .inner
                .entries
                .borrow()
                .iter()
                .map(|entry| (Rc::clone(&entry.active), Rc::clone(&entry.handler)))
                .collect();
            for (active, handler) in targets {
                if active.get() && !self.inner.closed.get() {
                    handler(&event);
                }
            }
        }
        self.inner.dispatching.set(false);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Drop every handler and refuse further events and subscriptions.
    pub fn close(&self) {
        self.inner.closed.set(true);
        let drained: Vec<Entry<E>> = self.inner.entries.borrow_mut().drain(..).collect();
        for entry in &drained {
            entry.active.set(false);
        }
        drop(drained);
        self.inner.queue.borrow_mut().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }
}

/// Registration guard; dropping it unregisters the handler.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_subscription_stops_delivery() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = bus.subscribe(move |value| sink.borrow_mut().push(*value));

        bus.emit(1);
        drop(sub);
        bus.emit(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn nested_emits_are_delivered_in_order() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let reemit = bus.clone();
        let _first = bus.subscribe(move |value| {
            if *value == 1 {
                reemit.emit(2);
            }
        });
        let sink = Rc::clone(&seen);
        let _second = bus.subscribe(move |value| sink.borrow_mut().push(*value));

        bus.emit(1);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn closed_bus_ignores_events_and_subscribers() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let _sub = bus.subscribe(move |_| sink.set(sink.get() + 1));

        bus.close();
        bus.emit(1);
        let late = Rc::clone(&seen);
        let _late = bus.subscribe(move |_| late.set(late.get() + 10));
        bus.emit(2);

        assert_eq!(seen.get(), 0);
        assert!(bus.is_closed());
    }

    #[test]
    fn unsubscribe_inside_handler_prevents_later_delivery() {
        let bus = EventBus::<u32>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let holder = Rc::clone(&slot);
        let _killer = bus.subscribe(move |_| {
            holder.borrow_mut().take();
        });
        let sink = Rc::clone(&count);
        *slot.borrow_mut() = Some(bus.subscribe(move |_| sink.set(sink.get() + 1)));

        bus.emit(1);
        bus.emit(2);

        assert_eq!(count.get(), 0);
    }
}
