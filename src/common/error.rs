//! Error types for robotics_decisions

use thiserror::Error;

use crate::common::types::GridCell;

/// Main error type for the planners and solvers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoboticsError {
    /// The planning problem cannot be solved as posed
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Queried cell lies outside the grid
    #[error("Cell {0} is outside the grid")]
    OutOfGrid(GridCell),
    /// Queried cell is occupied, there is no value or action there
    #[error("Cell {0} is an obstacle")]
    ObstacleCell(GridCell),
}

/// Result type alias for robotics operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;
