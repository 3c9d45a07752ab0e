//! robotics_decisions - planners and solvers for robotics course problems
//!
//! This crate provides a joint-space RRT planner for a planar 4R
//! manipulator among circular obstacles, and value-iteration solvers for
//! deterministic and stochastic grid worlds.

// Core modules
pub mod common;
pub mod utils;
pub mod scene;

// Algorithm modules
pub mod arm_navigation;
pub mod path_planning;
pub mod decision_making;

// Re-export common types for convenience
pub use common::{Point2D, Configuration, CircleObstacle, GridCell};
pub use common::{DistanceMetric, GridSolver};
pub use common::{RoboticsError, RoboticsResult};
