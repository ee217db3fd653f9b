use super::Position;
use std::time::{Duration, Instant};

/// In-flight interpolation from `start` to `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub start: Position,
    pub target: Position,
    pub started_at: Instant,
    pub duration: Duration,
}

impl Animation {
    /// Normalized progress in [0, 1]. A zero duration is always complete.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    /// Eased position at `now`
    pub fn position_at(&self, now: Instant) -> Position {
        self.start.lerp(&self.target, ease_out_cubic(self.progress(now)))
    }
}

/// Cubic ease-out: fast start, slow finish. Input is clamped to [0, 1].
///
/// ```
/// use uwb_tracker::entity::ease_out_cubic;
///
/// assert_eq!(ease_out_cubic(0.0), 0.0);
/// assert_eq!(ease_out_cubic(0.5), 0.875);
/// assert_eq!(ease_out_cubic(1.0), 1.0);
/// ```
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
