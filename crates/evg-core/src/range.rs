//! Closed intervals of kinematic variables and cut application.

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` of a kinematic variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range1D {
    /// Lower edge.
    pub min: f64,
    /// Upper edge.
    pub max: f64,
}

impl Range1D {
    /// Creates a range from its edges without validation.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The canonical empty range.
    pub const fn empty() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    /// Width of the range (may be negative for inverted ranges).
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Whether the range holds no usable phase space.
    pub fn is_empty(&self) -> bool {
        !(self.max > 0.0 && self.min < self.max)
    }

    /// Inclusive containment test.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Narrows the range by user cuts.
    ///
    /// A cut lying inside the range replaces the matching edge. A minimum cut
    /// above the upper edge, or a maximum cut below the lower edge, empties the
    /// range. Cuts never widen the range.
    pub fn apply_cuts(&mut self, min_cut: Option<f64>, max_cut: Option<f64>) {
        let original = *self;
        if let Some(cut) = min_cut {
            if original.contains(cut) {
                self.min = cut;
            }
        }
        if let Some(cut) = max_cut {
            if original.contains(cut) {
                self.max = cut;
            }
        }
        let above = min_cut.map_or(false, |cut| cut > original.max);
        let below = max_cut.map_or(false, |cut| cut < original.min);
        if above || below {
            *self = Range1D::empty();
        }
    }

    /// Lowers the upper edge to `ceiling` when it is tighter.
    pub fn cap_max(&mut self, ceiling: f64) {
        self.max = self.max.min(ceiling);
    }
}
