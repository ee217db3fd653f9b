// Per-entity position smoothing: outlier clamp + moving average

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;


/// Position filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of accepted samples kept for the moving average (0 is treated as 1)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Largest step allowed between consecutive accepted positions (world units)
    #[serde(default = "default_max_jump_distance")]
    pub max_jump_distance: f64,

    /// Weight on the raw sample when blending with the history mean (0-1).
    /// Lower values smooth more.
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,
}

fn default_history_size() -> usize {
    3
}

fn default_max_jump_distance() -> f64 {
    50.0
}

fn default_smoothing_factor() -> f64 {
    0.5
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            max_jump_distance: default_max_jump_distance(),
            smoothing_factor: default_smoothing_factor(),
        }
    }
}

/// Result of filtering one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutcome {
    /// The sample as stored in history, after outlier clamping
    pub accepted: (f64, f64),

    /// The smoothed position (now the filter's last position)
    pub filtered: (f64, f64),

    /// True if the raw sample was further than `max_jump_distance` away
    pub clamped: bool,
}

/// Moving-average filter with outlier clamping over a bounded history.
///
/// Every output lies within `max_jump_distance` of the previous output.
#[derive(Debug, Clone)]
pub struct PositionFilter {
    config: FilterConfig,
    capacity: usize,
    history: VecDeque<(f64, f64)>,
    last_position: Option<(f64, f64)>,
}

impl PositionFilter {
    pub fn new(config: FilterConfig) -> Self {
        let capacity = config.history_size.max(1);
        Self {
            config,
            capacity,
            history: VecDeque::with_capacity(capacity + 1),
            last_position: None,
        }
    }

    /// Filter a raw sample and return the smoothed position
    pub fn filter(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.filter_sample(x, y).filtered
    }

    /// Filter a raw sample, reporting the clamped sample alongside the output.
    ///
    /// The first sample after construction or `reset()` is accepted as is.
    pub fn filter_sample(&mut self, x: f64, y: f64) -> FilterOutcome {
        let last = match self.last_position {
            Some(last) => last,
            None => {
                self.history.push_back((x, y));
                self.last_position = Some((x, y));
                return FilterOutcome {
                    accepted: (x, y),
                    filtered: (x, y),
                    clamped: false,
                };
            }
        };

        let max_jump = self.config.max_jump_distance;
        let (accepted, clamped) = clamp_step(last, (x, y), max_jump);
        if clamped {
            debug!(
                distance = distance(last, (x, y)),
                max_jump_distance = max_jump,
                "Outlier clamped"
            );
        }

        self.history.push_back(accepted);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let blended = if self.history.len() > 1 {
            let n = self.history.len() as f64;
            let (sum_x, sum_y) = self
                .history
                .iter()
                .fold((0.0, 0.0), |(sx, sy), &(hx, hy)| (sx + hx, sy + hy));
            let (avg_x, avg_y) = (sum_x / n, sum_y / n);
            let s = self.config.smoothing_factor;
            (
                accepted.0 * s + avg_x * (1.0 - s),
                accepted.1 * s + avg_y * (1.0 - s),
            )
        } else {
            accepted
        };

        // The history mean can sit further back than one step; hold the output to the same cap.
        let (filtered, _) = clamp_step(last, blended, max_jump);
        self.last_position = Some(filtered);

        FilterOutcome {
            accepted,
            filtered,
            clamped,
        }
    }

    /// Forget history so the next sample is accepted as is
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_position = None;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last_position(&self) -> Option<(f64, f64)> {
        self.last_position
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

impl Default for PositionFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

/// Euclidean distance between two planar points
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

/// Project `to` onto the circle of radius `max` around `from` if it lies outside it.
///
/// Direction is preserved; returns the (possibly moved) point and whether it moved.
fn clamp_step(from: (f64, f64), to: (f64, f64), max: f64) -> ((f64, f64), bool) {
    let d = distance(from, to);
    if d > max && d > 0.0 {
        let dir_x = (to.0 - from.0) / d;
        let dir_y = (to.1 - from.1) / d;
        ((from.0 + dir_x * max, from.1 + dir_y * max), true)
    } else {
        (to, false)
    }
}
