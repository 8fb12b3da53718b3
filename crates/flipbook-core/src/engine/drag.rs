use super::FlipDirection;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Commit(FlipDirection),
    SnapBack,
}

/// Leftward travel (negative `dx`) turns forward, like lifting a right-hand page.
pub fn classify_release(dx: f32, threshold: f32) -> DragOutcome {
    if !dx.is_finite() || dx.abs() < threshold {
        return DragOutcome::SnapBack;
    }
    if dx < 0.0 {
        DragOutcome::Commit(FlipDirection::Forward)
    } else {
        DragOutcome::Commit(FlipDirection::Backward)
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct DragGesture {
    origin_x: f32,
    last_x: f32,
}

impl DragGesture {
    pub(super) fn start(x: f32) -> Self {
        Self {
            origin_x: x,
            last_x: x,
        }
    }

    pub(super) fn track(&mut self, x: f32) {
        if x.is_finite() {
            self.last_x = x;
        }
    }

    pub(super) fn displacement(&self) -> f32 {
        self.last_x - self.origin_x
    }
}

/// Eases a released page back to rest.
#[derive(Debug, Clone, Copy)]
pub(super) struct Settle {
    from_offset: f32,
    started: Instant,
    duration: Duration,
}

impl Settle {
    pub(super) fn new(from_offset: f32, started: Instant, duration: Duration) -> Self {
        Self {
            from_offset,
            started,
            duration,
        }
    }

    pub(super) fn offset(&self, now: Instant) -> f32 {
        let remaining = 1.0 - progress(self.started, self.duration, now);
        self.from_offset * remaining * remaining
    }

    pub(super) fn is_done(&self, now: Instant) -> bool {
        progress(self.started, self.duration, now) >= 1.0
    }
}

pub(super) fn progress(started: Instant, duration: Duration, now: Instant) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(started);
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}
