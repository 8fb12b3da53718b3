//! One mounted reader: registry, binder, flip engine and controller wired
//! together for the lifetime of a mount.

use crate::binder::{ImageLoad, PageHandle, PageSurface, RenderSurfaceBinder, SurfaceBinding};
use crate::controller::{ControlsView, NavIntent, NavMirror, NavigationController, SharedEngine};
use crate::engine::{BookEngine, EngineError, FlipEngine, FlipEvent, FlipFrame, FlipState};
use crate::events::{EventBus, Subscription};
use crate::keyboard::{KeyListenerGuard, KeyboardHub};
use crate::layout::SurfaceSize;
use crate::options::ReaderOptions;
use crate::page::{Page, PageRegistry};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the host hands over at mount time.
#[derive(Debug, Clone, Default)]
pub struct ReaderProps {
    pub title: String,
    pub pages: Vec<Page>,
    pub options: ReaderOptions,
}

enum Mount {
    /// No engine could be constructed; the placeholder is shown.
    Placeholder(EngineError),
    Interactive {
        engine: SharedEngine,
        controller: NavigationController,
        _forward: Subscription,
        _keys: KeyListenerGuard,
    },
}

/// Snapshot for drawing the reader at one instant.
#[derive(Debug, Clone)]
pub struct ReaderView<'a> {
    pub title: &'a str,
    /// `None` while degraded to the placeholder.
    pub frame: Option<FlipFrame>,
    pub controls: ControlsView,
    pub surfaces: &'a [PageSurface],
}

impl ReaderView<'_> {
    pub fn is_placeholder(&self) -> bool {
        self.frame
            .is_none_or(|frame| frame.state == FlipState::Empty)
    }
}

pub struct FlipbookReader {
    title: String,
    options: ReaderOptions,
    registry: PageRegistry,
    binder: RenderSurfaceBinder,
    binding: SurfaceBinding,
    keys: KeyboardHub,
    hooks: EventBus<FlipEvent>,
    mount: Mount,
}

impl FlipbookReader {
    /// Mount a reader on `surface`. A missing or degenerate surface degrades
    /// to the placeholder; a later [`resize`](Self::resize) retries.
    pub fn mount(
        props: ReaderProps,
        surface: Option<SurfaceSize>,
        keys: &KeyboardHub,
        now: Instant,
    ) -> Self {
        let mut registry = PageRegistry::new();
        registry.set_pages(props.pages);
        let mut binder = RenderSurfaceBinder::new();
        let binding = binder.bind(registry.pages());

        let mut reader = Self {
            title: props.title,
            options: props.options.sanitized(),
            registry,
            binder,
            binding,
            keys: keys.clone(),
            hooks: EventBus::new(),
            mount: Mount::Placeholder(EngineError::MissingSurface),
        };
        reader.mount_engine(surface, now);
        info!(
            title = %reader.title,
            pages = reader.registry.total_pages(),
            interactive = reader.is_interactive(),
            "Reader mounted"
        );
        reader
    }

    fn mount_engine(&mut self, surface: Option<SurfaceSize>, now: Instant) {
        let engine = match BookEngine::new(self.options.clone(), surface) {
            Ok(engine) => engine,
            Err(err) => {
                warn!(error = %err, "Flip engine unavailable; showing placeholder");
                self.mount = Mount::Placeholder(err);
                return;
            }
        };
        let engine: SharedEngine = Rc::new(RefCell::new(engine));
        let controller =
            NavigationController::new(Rc::clone(&engine), self.options.pagination_radius);
        let hooks = self.hooks.clone();
        let forward = engine
            .borrow()
            .events()
            .subscribe(move |event| hooks.emit(*event));
        engine.borrow_mut().rebind(&self.binding, now);
        let keys = controller.attach_keyboard(&self.keys);
        self.mount = Mount::Interactive {
            engine,
            controller,
            _forward: forward,
            _keys: keys,
        };
    }

    /// Replace the page set without remounting. Returns false when the
    /// engine refused the new surfaces; the previous pages stay in place.
    pub fn set_pages(&mut self, pages: Vec<Page>, now: Instant) -> bool {
        let mut registry = self.registry.clone();
        registry.set_pages(pages);
        let binding = self.binder.bind(registry.pages());
        let accepted = match &self.mount {
            Mount::Interactive { engine, .. } => match engine.try_borrow_mut() {
                Ok(mut engine) => engine.rebind(&binding, now),
                Err(_) => {
                    warn!("Engine busy during page rebind; keeping previous surfaces bound");
                    false
                }
            },
            Mount::Placeholder(_) => true,
        };
        if accepted {
            self.registry = registry;
            self.binding = binding;
        }
        accepted
    }

    /// Register a host hook for engine notifications. Hooks survive engine
    /// re-creation and stop firing at unmount.
    pub fn subscribe(&self, handler: impl Fn(&FlipEvent) + 'static) -> Subscription {
        self.hooks.subscribe(handler)
    }

    pub fn dispatch(&self, intent: NavIntent, now: Instant) -> bool {
        match &self.mount {
            Mount::Interactive { controller, .. } => controller.dispatch(intent, now),
            Mount::Placeholder(_) => false,
        }
    }

    pub fn pointer_down(&self, x: f32, now: Instant) -> bool {
        self.with_engine(|engine| engine.pointer_down(x, now))
            .unwrap_or(false)
    }

    pub fn pointer_move(&self, x: f32, now: Instant) {
        self.with_engine(|engine| engine.pointer_move(x, now));
    }

    pub fn pointer_up(&self, x: f32, now: Instant) {
        self.with_engine(|engine| engine.pointer_up(x, now));
    }

    pub fn tick(&self, now: Instant) {
        self.with_engine(|engine| engine.tick(now));
    }

    pub fn is_animating(&self) -> bool {
        match &self.mount {
            Mount::Interactive { engine, .. } => engine
                .try_borrow()
                .map(|engine| engine.is_animating())
                .unwrap_or(true),
            Mount::Placeholder(_) => false,
        }
    }

    pub fn resize(&mut self, surface: SurfaceSize, now: Instant) {
        if self.is_interactive() {
            self.with_engine(|engine| engine.resize(surface));
            return;
        }
        debug!(
            width = surface.width,
            height = surface.height,
            "Retrying flip engine construction"
        );
        self.mount_engine(Some(surface), now);
    }

    /// Record an image outcome for one surface of the current binding.
    pub fn mark_image(&mut self, handle: PageHandle, load: ImageLoad) -> bool {
        self.binding.set_image_load(handle, load)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[Page] {
        self.registry.pages()
    }

    pub fn surfaces(&self) -> &[PageSurface] {
        self.binding.surfaces()
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.mount, Mount::Interactive { .. })
    }

    /// Why the reader is showing the placeholder, if an engine failed.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match &self.mount {
            Mount::Placeholder(err) => Some(err),
            Mount::Interactive { .. } => None,
        }
    }

    /// Engine state as mirrored through notifications.
    pub fn mirror(&self) -> Option<NavMirror> {
        match &self.mount {
            Mount::Interactive { controller, .. } => Some(controller.mirror()),
            Mount::Placeholder(_) => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.mirror().map_or(0, |mirror| mirror.current_index)
    }

    pub fn is_flipping(&self) -> bool {
        self.mirror().is_some_and(|mirror| mirror.is_flipping())
    }

    pub fn view(&self, now: Instant) -> ReaderView<'_> {
        let (frame, controls) = match &self.mount {
            Mount::Interactive { engine, controller, .. } => (
                engine.try_borrow().ok().map(|engine| engine.frame(now)),
                controller.controls(),
            ),
            Mount::Placeholder(_) => (None, ControlsView::disabled()),
        };
        ReaderView {
            title: &self.title,
            frame,
            controls,
            surfaces: self.binding.surfaces(),
        }
    }

    /// Tear the reader down. Dropping it has the same effect.
    pub fn unmount(self) {
        info!(title = %self.title, "Reader unmounted");
    }

    fn with_engine<T>(&self, f: impl FnOnce(&mut dyn FlipEngine) -> T) -> Option<T> {
        let Mount::Interactive { engine, .. } = &self.mount else {
            return None;
        };
        match engine.try_borrow_mut() {
            Ok(mut engine) => Some(f(&mut *engine)),
            Err(_) => {
                warn!("Engine re-entered from its own notification; call dropped");
                None
            }
        }
    }
}

impl Drop for FlipbookReader {
    fn drop(&mut self) {
        self.hooks.close();
        if let Mount::Interactive { engine, .. } = &self.mount {
            if let Ok(mut engine) = engine.try_borrow_mut() {
                engine.release();
            }
        }
        debug!("Reader resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::NavKey;
    use std::time::Duration;

    const FLIP: Duration = Duration::from_millis(600);

    fn pages(numbers: &[u32]) -> Vec<Page> {
        numbers
            .iter()
            .map(|n| Page::new(format!("p{n}"), *n, format!("/img/{n}.jpg")))
            .collect()
    }

    fn props(count: u32) -> ReaderProps {
        ReaderProps {
            title: "Spring Issue".to_string(),
            pages: pages(&(1..=count).collect::<Vec<_>>()),
            options: ReaderOptions::default(),
        }
    }

    fn surface() -> Option<SurfaceSize> {
        Some(SurfaceSize::new(1400.0, 900.0))
    }

    fn recorder(reader: &FlipbookReader) -> (Rc<RefCell<Vec<FlipEvent>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = reader.subscribe(move |event| sink.borrow_mut().push(*event));
        (seen, sub)
    }

    #[test]
    fn pages_are_presented_in_page_number_order() {
        let hub = KeyboardHub::new();
        let reader = FlipbookReader::mount(
            ReaderProps {
                pages: pages(&[2, 1, 3]),
                ..ReaderProps::default()
            },
            surface(),
            &hub,
            Instant::now(),
        );
        let order: Vec<u32> = reader.surfaces().iter().map(|s| s.page_number).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn navigation_is_clamped_at_both_ends() {
        let hub = KeyboardHub::new();
        let mut now = Instant::now();
        let reader = FlipbookReader::mount(props(3), surface(), &hub, now);

        assert!(!reader.dispatch(NavIntent::Prev, now));
        assert_eq!(reader.current_index(), 0);

        for _ in 0..2 {
            assert!(reader.dispatch(NavIntent::Next, now));
            now += FLIP;
            reader.tick(now);
        }
        assert_eq!(reader.current_index(), 2);
        assert!(!reader.dispatch(NavIntent::Next, now));
        assert_eq!(reader.current_index(), 2);
    }

    #[test]
    fn new_page_set_of_different_size_resets_to_first_page() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let mut reader = FlipbookReader::mount(props(5), surface(), &hub, now);
        reader.dispatch(NavIntent::PageNumber(4), now);
        reader.tick(now + FLIP);
        assert_eq!(reader.current_index(), 3);

        reader.set_pages(pages(&[1, 2]), now + FLIP);
        assert_eq!(reader.current_index(), 0);
        assert_eq!(reader.view(now + FLIP).controls.label, "Page 1 of 2");
    }

    #[test]
    fn empty_page_set_shows_placeholder_and_ignores_navigation() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let mut reader = FlipbookReader::mount(props(3), surface(), &hub, now);
        reader.set_pages(Vec::new(), now);

        assert!(reader.view(now).is_placeholder());
        assert!(!reader.dispatch(NavIntent::Next, now));
        assert!(!reader.dispatch(NavIntent::Prev, now));
        assert!(!reader.dispatch(NavIntent::PageNumber(2), now));
        assert_eq!(reader.current_index(), 0);
    }

    #[test]
    fn unmount_detaches_key_listeners_and_hooks() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let first = FlipbookReader::mount(props(3), surface(), &hub, now);
        let second = FlipbookReader::mount(props(3), surface(), &hub, now);
        let (first_seen, _first_sub) = recorder(&first);
        assert_eq!(hub.listener_count(), 2);

        first.unmount();
        assert_eq!(hub.listener_count(), 1);

        hub.dispatch(NavKey::ArrowRight, now);
        second.tick(now + FLIP);
        assert!(first_seen.borrow().is_empty());
        assert_eq!(second.current_index(), 1);
    }

    #[test]
    fn missing_surface_degrades_then_recovers_on_resize() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let mut reader = FlipbookReader::mount(props(4), None, &hub, now);
        let (seen, _sub) = recorder(&reader);

        assert!(!reader.is_interactive());
        assert_eq!(reader.engine_error(), Some(&EngineError::MissingSurface));
        assert!(reader.view(now).is_placeholder());
        assert!(!reader.dispatch(NavIntent::Next, now));
        assert_eq!(hub.listener_count(), 0);

        reader.resize(SurfaceSize::new(1400.0, 900.0), now);
        assert!(reader.is_interactive());
        assert_eq!(hub.listener_count(), 1);
        assert!(matches!(
            seen.borrow().last(),
            Some(FlipEvent::Init { total: 4, .. })
        ));
    }

    #[test]
    fn hooks_observe_flip_lifecycle_in_order() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let reader = FlipbookReader::mount(props(3), surface(), &hub, now);
        let (seen, _sub) = recorder(&reader);

        reader.dispatch(NavIntent::Next, now);
        assert!(reader.is_flipping());
        reader.tick(now + FLIP);
        assert!(!reader.is_flipping());

        assert_eq!(
            *seen.borrow(),
            vec![
                FlipEvent::StateChange(FlipState::Flipping),
                FlipEvent::FlipStart { from: 0, to: 1 },
                FlipEvent::Flip { index: 1 },
                FlipEvent::StateChange(FlipState::Idle),
            ]
        );
    }

    #[test]
    fn busy_engine_keeps_previous_pages_and_surfaces() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let mut reader = FlipbookReader::mount(props(3), surface(), &hub, now);
        let before = reader.surfaces()[0].handle;
        let engine = match &reader.mount {
            Mount::Interactive { engine, .. } => Rc::clone(engine),
            Mount::Placeholder(err) => panic!("expected an engine, got {err}"),
        };

        let busy = engine.borrow();
        assert!(!reader.set_pages(pages(&[1, 2]), now));
        drop(busy);

        assert_eq!(reader.pages().len(), 3);
        assert_eq!(reader.surfaces().len(), 3);
        assert_eq!(reader.surfaces()[0].handle, before);
        assert_eq!(engine.borrow().page_count(), 3);
        assert!(reader.mark_image(before, ImageLoad::Ready));

        assert!(reader.set_pages(pages(&[1, 2]), now));
        assert_eq!(reader.surfaces().len(), 2);
    }

    #[test]
    fn image_results_for_replaced_surfaces_are_ignored() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let mut reader = FlipbookReader::mount(props(2), surface(), &hub, now);
        let stale = reader.surfaces()[0].handle;

        reader.set_pages(pages(&[1, 2]), now);
        assert!(!reader.mark_image(stale, ImageLoad::Ready));

        let fresh = reader.surfaces()[1].handle;
        assert!(reader.mark_image(fresh, ImageLoad::Failed));
        assert_eq!(reader.surfaces()[1].load, ImageLoad::Failed);
        assert_eq!(reader.surfaces()[0].load, ImageLoad::Pending);
    }

    #[test]
    fn short_drag_keeps_page_and_long_drag_turns_one() {
        let hub = KeyboardHub::new();
        let now = Instant::now();
        let reader = FlipbookReader::mount(props(3), surface(), &hub, now);

        reader.pointer_down(500.0, now);
        reader.pointer_up(470.0, now);
        reader.tick(now + FLIP);
        assert_eq!(reader.current_index(), 0);

        let later = now + FLIP;
        reader.pointer_down(500.0, later);
        reader.pointer_move(460.0, later);
        reader.pointer_up(420.0, later);
        reader.tick(later + FLIP);
        assert_eq!(reader.current_index(), 1);
    }
}
