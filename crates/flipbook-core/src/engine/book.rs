use super::drag::{DragGesture, Settle, progress};
use super::{
    DragOutcome, EngineError, FlipDirection, FlipEngine, FlipEvent, FlipFrame, FlipState,
    TurnFrame, classify_release,
};
use crate::binder::{PageHandle, SurfaceBinding};
use crate::events::EventBus;
use crate::layout::{BookLayout, SurfaceSize, compute_layout, spread_for};
use crate::options::ReaderOptions;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
struct Turn {
    from: usize,
    to: usize,
    started: Instant,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Empty,
    Idle,
    Flipping(Turn),
    Dragging(DragGesture),
}

/// Timed page-turn state machine.
///
/// Commands issued while a flip or drag is running are ignored, so a burst
/// of "next" presses moves at most one page per completed flip.
pub struct BookEngine {
    options: ReaderOptions,
    surface: SurfaceSize,
    layout: BookLayout,
    handles: Vec<PageHandle>,
    bound_generation: Option<u64>,
    current: usize,
    phase: Phase,
    settle: Option<Settle>,
    initialized: bool,
    released: bool,
    events: EventBus<FlipEvent>,
}

impl BookEngine {
    pub fn new(options: ReaderOptions, surface: Option<SurfaceSize>) -> Result<Self, EngineError> {
        let surface = surface.ok_or(EngineError::MissingSurface)?;
        if !surface.is_usable() {
            return Err(EngineError::UnusableSurface {
                width: surface.width,
                height: surface.height,
            });
        }
        let options = options.sanitized();
        let layout = compute_layout(&options, surface);
        debug!(
            width = layout.page.width,
            height = layout.page.height,
            orientation = %layout.orientation,
            "Flip engine constructed"
        );
        Ok(Self {
            options,
            surface,
            layout,
            handles: Vec::new(),
            bound_generation: None,
            current: 0,
            phase: Phase::Empty,
            settle: None,
            initialized: false,
            released: false,
            events: EventBus::new(),
        })
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn bound_handles(&self) -> &[PageHandle] {
        &self.handles
    }

    fn set_phase(&mut self, phase: Phase) {
        let before = self.state();
        self.phase = phase;
        let after = self.state();
        if before != after {
            debug!(from = %before, to = %after, "Flip state changed");
            self.events.emit(FlipEvent::StateChange(after));
        }
    }

    fn start_flip(&mut self, to: usize, now: Instant) -> bool {
        if self.released || !matches!(self.phase, Phase::Idle | Phase::Dragging(_)) {
            return false;
        }
        if to >= self.handles.len() || to == self.current {
            return false;
        }
        let from = self.current;
        self.settle = None;
        self.set_phase(Phase::Flipping(Turn {
            from,
            to,
            started: now,
        }));
        self.events.emit(FlipEvent::FlipStart { from, to });
        if self.options.flip_duration().is_zero() {
            self.finish_flip(now);
        }
        true
    }

    fn finish_flip(&mut self, now: Instant) {
        let Phase::Flipping(turn) = self.phase else {
            return;
        };
        if progress(turn.started, self.options.flip_duration(), now) < 1.0 {
            return;
        }
        self.current = turn.to;
        info!(page = self.current + 1, total = self.handles.len(), "Flipped to page");
        self.phase = Phase::Idle;
        self.events.emit(FlipEvent::Flip {
            index: self.current,
        });
        self.events.emit(FlipEvent::StateChange(FlipState::Idle));
    }

    fn is_stale(&self, binding: &SurfaceBinding) -> bool {
        self.bound_generation
            .is_some_and(|bound| binding.generation() < bound)
    }
}

impl FlipEngine for BookEngine {
    fn state(&self) -> FlipState {
        match self.phase {
            Phase::Empty => FlipState::Empty,
            Phase::Idle => FlipState::Idle,
            Phase::Flipping(_) => FlipState::Flipping,
            Phase::Dragging(_) => FlipState::Dragging,
        }
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn page_count(&self) -> usize {
        self.handles.len()
    }

    fn layout(&self) -> BookLayout {
        self.layout
    }

    fn events(&self) -> &EventBus<FlipEvent> {
        &self.events
    }

    fn next(&mut self, now: Instant) -> bool {
        self.start_flip(self.current.saturating_add(1), now)
    }

    fn prev(&mut self, now: Instant) -> bool {
        match self.current.checked_sub(1) {
            Some(target) => self.start_flip(target, now),
            None => false,
        }
    }

    fn go_to(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.handles.len() {
            debug!(index, total = self.handles.len(), "Ignoring out-of-range page jump");
            return false;
        }
        self.start_flip(index, now)
    }

    fn pointer_down(&mut self, x: f32, _now: Instant) -> bool {
        if self.released || !matches!(self.phase, Phase::Idle) || !x.is_finite() {
            return false;
        }
        self.settle = None;
        self.set_phase(Phase::Dragging(DragGesture::start(x)));
        true
    }

    fn pointer_move(&mut self, x: f32, _now: Instant) {
        if let Phase::Dragging(gesture) = &mut self.phase {
            gesture.track(x);
        }
    }

    fn pointer_up(&mut self, x: f32, now: Instant) {
        let Phase::Dragging(mut gesture) = self.phase else {
            return;
        };
        gesture.track(x);
        let dx = gesture.displacement();

        let target = match classify_release(dx, self.options.swipe_distance) {
            DragOutcome::Commit(FlipDirection::Forward) => self.current.checked_add(1),
            DragOutcome::Commit(FlipDirection::Backward) => self.current.checked_sub(1),
            DragOutcome::SnapBack => None,
        }
        .filter(|target| *target < self.handles.len());

        match target {
            Some(target) => {
                debug!(dx, target, "Drag committed to page turn");
                self.start_flip(target, now);
            }
            None => {
                debug!(dx, "Drag released without turning; settling back");
                let limit = self.layout.page.width;
                self.settle = Some(Settle::new(
                    dx.clamp(-limit, limit),
                    now,
                    self.options.settle_duration(),
                ));
                self.set_phase(Phase::Idle);
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        if self.released {
            return;
        }
        self.finish_flip(now);
        if self.settle.is_some_and(|settle| settle.is_done(now)) {
            self.settle = None;
        }
    }

    fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Flipping(_)) || self.settle.is_some()
    }

    fn rebind(&mut self, binding: &SurfaceBinding, _now: Instant) -> bool {
        if self.released {
            return false;
        }
        if self.is_stale(binding) {
            warn!(
                generation = binding.generation(),
                bound = ?self.bound_generation,
                "Refusing to rebind stale page surfaces"
            );
            return false;
        }

        let previous_total = self.handles.len();
        self.handles = binding.handles();
        self.bound_generation = Some(binding.generation());
        self.settle = None;
        let total = self.handles.len();

        if total != previous_total {
            self.current = 0;
        } else {
            self.current = self.current.min(total.saturating_sub(1));
        }

        if total == 0 {
            info!("Bound to an empty page set; navigation disabled");
            self.set_phase(Phase::Empty);
        } else {
            self.set_phase(Phase::Idle);
        }

        if !self.initialized && total > 0 {
            self.initialized = true;
            self.events.emit(FlipEvent::Init {
                index: self.current,
                total,
                orientation: self.layout.orientation,
            });
        } else {
            self.events.emit(FlipEvent::Update {
                index: self.current,
                total,
            });
        }
        true
    }

    fn resize(&mut self, surface: SurfaceSize) {
        if self.released {
            return;
        }
        if !surface.is_usable() {
            warn!(
                width = surface.width,
                height = surface.height,
                "Ignoring unusable surface size"
            );
            return;
        }
        self.surface = surface;
        let layout = compute_layout(&self.options, surface);
        let orientation_changed = layout.orientation != self.layout.orientation;
        self.layout = layout;
        if orientation_changed {
            info!(orientation = %layout.orientation, "Book orientation changed");
            self.events
                .emit(FlipEvent::OrientationChange(layout.orientation));
        }
    }

    fn frame(&self, now: Instant) -> FlipFrame {
        let total = self.handles.len();
        let turn = match self.phase {
            Phase::Flipping(turn) => Some(TurnFrame {
                from: turn.from,
                to: turn.to,
                direction: if turn.to > turn.from {
                    FlipDirection::Forward
                } else {
                    FlipDirection::Backward
                },
                progress: progress(turn.started, self.options.flip_duration(), now),
            }),
            _ => None,
        };
        let drag_offset = match self.phase {
            Phase::Dragging(gesture) => {
                let limit = self.layout.page.width;
                gesture.displacement().clamp(-limit, limit)
            }
            _ => self.settle.map(|settle| settle.offset(now)).unwrap_or(0.0),
        };
        FlipFrame {
            state: self.state(),
            current: self.current,
            total,
            spread: spread_for(
                self.current,
                total,
                self.layout.orientation,
                self.options.show_cover,
            ),
            layout: self.layout,
            turn,
            drag_offset,
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.events.close();
        self.handles.clear();
        self.phase = Phase::Empty;
        self.settle = None;
        debug!("Flip engine released");
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::RenderSurfaceBinder;
    use crate::layout::Orientation;
    use crate::page::Page;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    const FLIP: Duration = Duration::from_millis(600);

    fn pages(count: u32) -> Vec<Page> {
        (1..=count)
            .map(|n| Page::new(format!("p{n}"), n, format!("/img/{n}.jpg")))
            .collect()
    }

    fn surface() -> Option<SurfaceSize> {
        Some(SurfaceSize::new(1400.0, 900.0))
    }

    fn engine_with(count: u32) -> (BookEngine, RenderSurfaceBinder, Instant) {
        let mut engine = BookEngine::new(ReaderOptions::default(), surface()).unwrap();
        let mut binder = RenderSurfaceBinder::new();
        let now = Instant::now();
        engine.rebind(&binder.bind(&pages(count)), now);
        (engine, binder, now)
    }

    fn flip_and_settle(engine: &mut BookEngine, started: Instant) -> Instant {
        let done = started + FLIP;
        engine.tick(done);
        done
    }

    fn record(engine: &BookEngine) -> (Rc<RefCell<Vec<FlipEvent>>>, crate::events::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = engine
            .events()
            .subscribe(move |event| sink.borrow_mut().push(*event));
        (seen, sub)
    }

    #[test]
    fn construction_requires_a_usable_surface() {
        assert_eq!(
            BookEngine::new(ReaderOptions::default(), None).err(),
            Some(EngineError::MissingSurface)
        );
        assert!(matches!(
            BookEngine::new(ReaderOptions::default(), Some(SurfaceSize::new(0.0, 10.0))),
            Err(EngineError::UnusableSurface { .. })
        ));
    }

    #[test]
    fn prev_at_first_page_is_clamped() {
        let (mut engine, _binder, now) = engine_with(3);
        assert!(!engine.prev(now));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.state(), FlipState::Idle);
    }

    #[test]
    fn next_at_last_page_is_clamped() {
        let (mut engine, _binder, mut now) = engine_with(3);
        for _ in 0..2 {
            assert!(engine.next(now));
            now = flip_and_settle(&mut engine, now);
        }
        assert_eq!(engine.current_index(), 2);
        assert!(!engine.next(now));
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn go_to_rejects_out_of_range_indices() {
        let (mut engine, _binder, now) = engine_with(5);
        assert!(!engine.go_to(usize::MAX, now));
        assert!(!engine.go_to(5, now));
        assert_eq!(engine.current_index(), 0);

        assert!(engine.go_to(3, now));
        flip_and_settle(&mut engine, now);
        assert_eq!(engine.current_index(), 3);
    }

    #[test]
    fn flip_emits_start_end_and_state_changes_in_order() {
        let (mut engine, _binder, now) = engine_with(3);
        let (seen, _sub) = record(&engine);

        engine.next(now);
        engine.tick(now + Duration::from_millis(300));
        assert_eq!(engine.state(), FlipState::Flipping);
        assert_eq!(engine.current_index(), 0);
        flip_and_settle(&mut engine, now);

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
    fn rapid_double_next_moves_one_page() {
        let (mut engine, _binder, now) = engine_with(5);
        assert!(engine.next(now));
        assert!(!engine.next(now + Duration::from_millis(10)));
        flip_and_settle(&mut engine, now);
        assert_eq!(engine.current_index(), 1);
        assert!(!engine.is_animating());
    }

    #[test]
    fn rebind_with_new_size_resets_index() {
        let (mut engine, mut binder, now) = engine_with(5);
        engine.go_to(3, now);
        let now = flip_and_settle(&mut engine, now);
        assert_eq!(engine.current_index(), 3);

        assert!(engine.rebind(&binder.bind(&pages(2)), now));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.page_count(), 2);
    }

    #[test]
    fn rebind_with_same_size_keeps_index() {
        let (mut engine, mut binder, now) = engine_with(4);
        engine.go_to(2, now);
        let now = flip_and_settle(&mut engine, now);

        engine.rebind(&binder.bind(&pages(4)), now);
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn stale_binding_is_refused() {
        let (mut engine, mut binder, now) = engine_with(3);
        let old = binder.bind(&pages(2));
        let fresh = binder.bind(&pages(4));
        assert!(engine.rebind(&fresh, now));
        assert!(!engine.rebind(&old, now));
        assert_eq!(engine.page_count(), 4);
        assert_eq!(engine.bound_handles(), fresh.handles().as_slice());
    }

    #[test]
    fn empty_rebind_disables_navigation() {
        let (mut engine, mut binder, now) = engine_with(3);
        engine.rebind(&binder.bind(&[]), now);

        assert_eq!(engine.state(), FlipState::Empty);
        assert!(!engine.next(now));
        assert!(!engine.prev(now));
        assert!(!engine.go_to(0, now));
        assert!(!engine.pointer_down(10.0, now));
        assert_eq!(engine.frame(now).spread, crate::layout::Spread::Empty);

        engine.rebind(&binder.bind(&pages(2)), now);
        assert_eq!(engine.state(), FlipState::Idle);
        assert!(engine.next(now));
    }

    #[test]
    fn init_fires_once_then_updates() {
        let mut engine = BookEngine::new(ReaderOptions::default(), surface()).unwrap();
        let mut binder = RenderSurfaceBinder::new();
        let (seen, _sub) = record(&engine);
        let now = Instant::now();

        engine.rebind(&binder.bind(&pages(3)), now);
        engine.rebind(&binder.bind(&pages(5)), now);

        let events = seen.borrow();
        assert!(events.contains(&FlipEvent::Init {
            index: 0,
            total: 3,
            orientation: Orientation::Landscape
        }));
        assert_eq!(events.last(), Some(&FlipEvent::Update { index: 0, total: 5 }));
    }

    #[test]
    fn short_drag_snaps_back_without_turning() {
        let (mut engine, _binder, now) = engine_with(3);
        assert!(engine.pointer_down(400.0, now));
        engine.pointer_move(385.0, now);
        assert_eq!(engine.state(), FlipState::Dragging);
        assert_eq!(engine.frame(now).drag_offset, -15.0);

        engine.pointer_up(370.0, now);
        assert_eq!(engine.state(), FlipState::Idle);
        assert_eq!(engine.current_index(), 0);
        assert!(engine.is_animating());
        assert_eq!(engine.frame(now).drag_offset, -30.0);

        engine.tick(now + Duration::from_millis(300));
        assert!(!engine.is_animating());
        assert_eq!(engine.frame(now + Duration::from_millis(300)).drag_offset, 0.0);
    }

    #[test]
    fn drag_with_nan_page_width_stays_bounded() {
        let options = ReaderOptions {
            width: f32::NAN,
            ..ReaderOptions::default()
        };
        let mut engine = BookEngine::new(options, surface()).unwrap();
        let mut binder = RenderSurfaceBinder::new();
        let now = Instant::now();
        engine.rebind(&binder.bind(&pages(3)), now);
        assert_eq!(engine.layout().page.width, 600.0);

        assert!(engine.pointer_down(400.0, now));
        engine.pointer_move(390.0, now);
        assert_eq!(engine.frame(now).drag_offset, -10.0);
        engine.pointer_up(380.0, now);
        assert_eq!(engine.frame(now).drag_offset, -20.0);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn long_forward_drag_turns_exactly_one_page() {
        let (mut engine, _binder, now) = engine_with(3);
        engine.pointer_down(400.0, now);
        engine.pointer_up(320.0, now);
        assert_eq!(engine.state(), FlipState::Flipping);
        flip_and_settle(&mut engine, now);
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn backward_drag_at_first_page_settles() {
        let (mut engine, _binder, now) = engine_with(3);
        engine.pointer_down(100.0, now);
        engine.pointer_up(200.0, now);
        assert_eq!(engine.state(), FlipState::Idle);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn resize_reports_orientation_changes() {
        let options = ReaderOptions {
            use_portrait: true,
            ..ReaderOptions::default()
        };
        let mut engine = BookEngine::new(options, surface()).unwrap();
        let (seen, _sub) = record(&engine);

        engine.resize(SurfaceSize::new(1300.0, 900.0));
        engine.resize(SurfaceSize::new(800.0, 900.0));
        engine.resize(SurfaceSize::new(700.0, 900.0));

        assert_eq!(
            *seen.borrow(),
            vec![FlipEvent::OrientationChange(Orientation::Portrait)]
        );
    }

    #[test]
    fn released_engine_ignores_everything() {
        let (mut engine, mut binder, now) = engine_with(3);
        let (seen, _sub) = record(&engine);
        engine.release();

        assert!(!engine.next(now));
        assert!(!engine.rebind(&binder.bind(&pages(2)), now));
        engine.tick(now + FLIP);
        assert!(seen.borrow().is_empty());
        assert!(engine.is_released());
    }
}
