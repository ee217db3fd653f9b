use crate::filter::{FilterConfig, PositionFilter};
use crate::sample::Metadata;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

mod animation;

pub use animation::{ease_out_cubic, Animation};

/// World-space position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance in the x/y plane (height is ignored for movement decisions)
    pub fn planar_distance(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation of every coordinate; `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Movement classification and animation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Filtered movement below this distance is ignored (world units)
    #[serde(default = "default_min_movement")]
    pub min_movement: f64,

    /// Length of the ease-out animation. 0 applies movement directly.
    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: u64,
}

fn default_min_movement() -> f64 {
    5.0
}

fn default_animation_duration_ms() -> u64 {
    250
}

impl MotionConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            min_movement: default_min_movement(),
            animation_duration_ms: default_animation_duration_ms(),
        }
    }
}

/// How a sample changed an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Below `min_movement`; position untouched
    Ignored,
    /// Applied immediately (animation disabled)
    Direct,
    /// Interpolating toward the new target
    Animated,
}

impl Movement {
    pub fn needs_redraw(self) -> bool {
        !matches!(self, Movement::Ignored)
    }
}

/// Tracked entity: filtered position, animation and display metadata
#[derive(Debug, Clone)]
pub struct EntityState {
    id: String,
    position: Position,
    previous_position: Option<Position>,
    metadata: Metadata,
    animation: Option<Animation>,
    filter: PositionFilter,
    motion: MotionConfig,
    last_update: Instant,
    dirty: bool,
}

impl EntityState {
    /// Create an entity from its first sample. The sample is shown as is.
    pub fn new(
        id: impl Into<String>,
        position: Position,
        filter: FilterConfig,
        motion: MotionConfig,
        now: Instant,
    ) -> Self {
        let mut filter = PositionFilter::new(filter);
        filter.filter(position.x, position.y);

        Self {
            id: id.into(),
            position,
            previous_position: None,
            metadata: Metadata::default(),
            animation: None,
            filter,
            motion,
            last_update: now,
            dirty: true,
        }
    }

    /// Feed a raw sample; returns true if the entity needs a redraw
    pub fn update_position(&mut self, x: f64, y: f64, z: f64) -> bool {
        self.update_position_at(x, y, z, Instant::now())
    }

    pub fn update_position_at(&mut self, x: f64, y: f64, z: f64, now: Instant) -> bool {
        self.apply_sample(x, y, z, now).needs_redraw()
    }

    /// Feed a raw sample and report how it was classified.
    ///
    /// Every sample refreshes the activity timestamp and the filter history,
    /// even when the resulting movement is ignored.
    pub fn apply_sample(&mut self, x: f64, y: f64, z: f64, now: Instant) -> Movement {
        self.last_update = now;

        let (fx, fy) = self.filter.filter(x, y);
        let target = Position::new(fx, fy, z);

        if self.position.planar_distance(&target) < self.motion.min_movement {
            return Movement::Ignored;
        }

        self.previous_position = Some(self.position);
        self.dirty = true;

        let duration = self.motion.animation_duration();
        if duration.is_zero() {
            self.position = target;
            self.animation = None;
            return Movement::Direct;
        }

        // Retargets from the current (possibly mid-flight) position
        self.animation = Some(Animation {
            start: self.position,
            target,
            started_at: now,
            duration,
        });
        Movement::Animated
    }

    /// Advance the animation; returns true while still animating
    pub fn update_animation(&mut self) -> bool {
        self.update_animation_at(Instant::now())
    }

    pub fn update_animation_at(&mut self, now: Instant) -> bool {
        let animation = match self.animation {
            Some(animation) => animation,
            None => return false,
        };

        self.dirty = true;

        if animation.is_finished(now) {
            self.position = animation.target;
            self.animation = None;
            return false;
        }

        self.position = animation.position_at(now);
        true
    }

    /// Drop filter history so the next sample starts fresh.
    /// An unfinished animation jumps to its target.
    pub fn restart_tracking(&mut self) {
        self.filter.reset();
        if let Some(animation) = self.animation.take() {
            self.position = animation.target;
            self.dirty = true;
        }
    }

    /// Clear the dirty flag once a consumer has rendered the update
    pub fn mark_processed(&mut self) {
        self.dirty = false;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last four characters of the id, used as the on-screen label
    pub fn short_id(&self) -> &str {
        let start = self
            .id
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.id[start..]
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn previous_position(&self) -> Option<Position> {
        self.previous_position
    }

    /// Where the entity is heading, if animating
    pub fn target(&self) -> Option<Position> {
        self.animation.map(|a| a.target)
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Replace display metadata; marks the entity dirty
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
        self.dirty = true;
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_update)
    }

    pub fn filter(&self) -> &PositionFilter {
        &self.filter
    }
}
