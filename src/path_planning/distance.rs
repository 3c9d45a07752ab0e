//! Joint-space distance metrics for sampling-based planners

use nalgebra::Vector4;

use crate::arm_navigation::angle_difference;
use crate::common::{Configuration, DistanceMetric};

/// Default goal tolerance for the L1 metrics, in degrees
pub const DEFAULT_GOAL_THRESHOLD: f64 = 5.0;

/// Sum of absolute per-joint angular differences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L1Distance {
    pub goal_threshold: f64,
}

impl Default for L1Distance {
    fn default() -> Self {
        Self {
            goal_threshold: DEFAULT_GOAL_THRESHOLD,
        }
    }
}

impl DistanceMetric for L1Distance {
    fn distance(&self, from: &Configuration, to: &Configuration) -> f64 {
        angle_difference(to, from).abs().sum()
    }

    fn goal_threshold(&self) -> f64 {
        self.goal_threshold
    }
}

/// L1 metric with a weight per joint, e.g. to penalise moving the
/// proximal joints more than the distal ones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedL1Distance {
    pub weights: Vector4<f64>,
    pub goal_threshold: f64,
}

impl WeightedL1Distance {
    pub fn new(weights: [f64; 4], goal_threshold: f64) -> Self {
        Self {
            weights: Vector4::from(weights),
            goal_threshold,
        }
    }
}

impl Default for WeightedL1Distance {
    fn default() -> Self {
        Self::new([1.0; 4], DEFAULT_GOAL_THRESHOLD)
    }
}

impl DistanceMetric for WeightedL1Distance {
    fn distance(&self, from: &Configuration, to: &Configuration) -> f64 {
        self.weights
            .component_mul(&angle_difference(to, from).abs())
            .sum()
    }

    fn goal_threshold(&self) -> f64 {
        self.goal_threshold
    }
}
