//! Common types used throughout robotics_decisions

use std::fmt;
use std::ops::Index;

use nalgebra::{Vector2, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arm_navigation::angle::normalize_angle;

/// Number of revolute joints of the planar manipulator
pub const NUM_JOINTS: usize = 4;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Minimum distance from this point to the segment `a`-`b`
    pub fn distance_to_segment(&self, a: &Point2D, b: &Point2D) -> f64 {
        let ab = b.to_vector() - a.to_vector();
        let ap = self.to_vector() - a.to_vector();
        let len_sq = ab.norm_squared();
        if len_sq == 0.0 {
            return ap.norm();
        }
        let t = (ap.dot(&ab) / len_sq).clamp(0.0, 1.0);
        let closest = a.to_vector() + ab * t;
        (self.to_vector() - closest).norm()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Joint-angle configuration of the 4R manipulator, in degrees.
///
/// Every angle is kept in (-180, 180]; construction normalizes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 4]", into = "[f64; 4]"))]
pub struct Configuration {
    angles: Vector4<f64>,
}

impl Configuration {
    pub fn new(angles: [f64; NUM_JOINTS]) -> Self {
        Self::from_vector(Vector4::from(angles))
    }

    pub fn from_vector(angles: Vector4<f64>) -> Self {
        Self {
            angles: angles.map(normalize_angle),
        }
    }

    pub fn zero() -> Self {
        Self {
            angles: Vector4::zeros(),
        }
    }

    pub fn angles(&self) -> &Vector4<f64> {
        &self.angles
    }

    pub fn to_array(&self) -> [f64; NUM_JOINTS] {
        [self.angles[0], self.angles[1], self.angles[2], self.angles[3]]
    }
}

impl Index<usize> for Configuration {
    type Output = f64;

    fn index(&self, joint: usize) -> &f64 {
        &self.angles[joint]
    }
}

impl From<[f64; NUM_JOINTS]> for Configuration {
    fn from(angles: [f64; NUM_JOINTS]) -> Self {
        Self::new(angles)
    }
}

impl From<Configuration> for [f64; NUM_JOINTS] {
    fn from(config: Configuration) -> Self {
        config.to_array()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}, {:.2}]",
            self.angles[0], self.angles[1], self.angles[2], self.angles[3]
        )
    }
}

/// Circular obstacle in the manipulator workspace (x, y, radius)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CircleObstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl CircleObstacle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Grid cell addressed by (row, column).
///
/// Coordinates are signed so that candidate cells produced by a move off
/// the edge of the grid can still be represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    pub row: i32,
    pub col: i32,
}

impl GridCell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Cell displaced by (d_row, d_col)
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl From<(i32, i32)> for GridCell {
    fn from(tuple: (i32, i32)) -> Self {
        Self { row: tuple.0, col: tuple.1 }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
