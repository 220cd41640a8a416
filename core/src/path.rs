//! Closed monster paths parameterised over `t ∈ [0, 1)`.

use std::fmt::Debug;

use glam::DVec2;

use crate::PathConfig;

/// Source of positions along the closed loop monsters walk.
pub trait PathProvider: Debug {
    /// World position at path parameter `t`; values outside `[0, 1)` wrap.
    fn point(&self, t: f64) -> DVec2;

    /// Total length of the loop in world units.
    fn length(&self) -> f64;
}

/// Square loop traversed clockwise from its upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareLoop {
    min: DVec2,
    side: f64,
}

impl SquareLoop {
    /// Creates a loop with the given side length centred at `center`.
    #[must_use]
    pub fn new(center: DVec2, side: f64) -> Self {
        let side = side.max(0.0);
        Self {
            min: center - DVec2::splat(side / 2.0),
            side,
        }
    }

    /// Builds the loop described by the path configuration.
    #[must_use]
    pub fn from_config(config: &PathConfig) -> Self {
        Self::new(config.center, config.side_length)
    }
}

impl PathProvider for SquareLoop {
    fn point(&self, t: f64) -> DVec2 {
        let mut t = if t.is_finite() { t.rem_euclid(1.0) } else { 0.0 };
        if t >= 1.0 {
            t = 0.0;
        }
        let travelled = t * 4.0;
        let leg = travelled.floor();
        let along = (travelled - leg) * self.side;
        let max = self.min + DVec2::splat(self.side);
        match leg as u32 {
            0 => DVec2::new(self.min.x + along, self.min.y),
            1 => DVec2::new(max.x, self.min.y + along),
            2 => DVec2::new(max.x - along, max.y),
            _ => DVec2::new(self.min.x, max.y - along),
        }
    }

    fn length(&self) -> f64 {
        self.side * 4.0
    }
}
