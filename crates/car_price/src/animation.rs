//! Count-up animation for the displayed price.
//!
//! The counter starts at zero and climbs towards the prediction in equal
//! increments of `max(prediction / 100, 100)`. The last increment is clamped
//! so the counter lands exactly on the prediction. Each call to
//! [`CounterAnimation::advance`] produces one frame; the caller decides how
//! long to wait between frames.

/// Number of increments the counter aims for.
const TARGET_FRAMES: f64 = 100.0;

/// Smallest increment, in currency units.
pub const MIN_STEP: f64 = 100.0;

/// Incremental state of the price counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    target: f64,
    step: f64,
    displayed: f64,
}

impl CounterAnimation {
    /// Starts a counter for the given prediction.
    ///
    /// A prediction at or below zero has nothing to count up through; the
    /// counter starts already finished on that value.
    #[must_use]
    pub fn new(target: f64) -> Self {
        Self {
            target,
            step: (target / TARGET_FRAMES).max(MIN_STEP),
            displayed: if target > 0.0 { 0.0 } else { target },
        }
    }

    /// The prediction being counted towards.
    #[must_use]
    pub const fn target(&self) -> f64 {
        self.target
    }

    /// Increment applied per frame.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Value currently shown.
    #[must_use]
    pub const fn displayed(&self) -> f64 {
        self.displayed
    }

    /// Whether the counter has reached the prediction.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.displayed >= self.target
    }

    /// Moves one frame forward and returns the new displayed value, or
    /// `None` once the prediction has been reached.
    pub fn advance(&mut self) -> Option<f64> {
        if self.is_finished() {
            return None;
        }
        self.displayed = (self.displayed + self.step).min(self.target);
        Some(self.displayed)
    }
}

impl Iterator for CounterAnimation {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.advance()
    }
}
