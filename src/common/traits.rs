//! Common traits defining interfaces for the planners and solvers

use crate::common::error::RoboticsResult;
use crate::common::types::{Configuration, GridCell};
use crate::decision_making::{Action, Solution};

/// Distance function over joint space, paired with the goal tolerance
/// expressed in the same units.
pub trait DistanceMetric {
    /// Distance between two configurations
    fn distance(&self, from: &Configuration, to: &Configuration) -> f64;

    /// A node closer than this to the goal may attempt a direct connection
    fn goal_threshold(&self) -> f64;
}

impl<M: DistanceMetric + ?Sized> DistanceMetric for &M {
    fn distance(&self, from: &Configuration, to: &Configuration) -> f64 {
        (**self).distance(from, to)
    }

    fn goal_threshold(&self) -> f64 {
        (**self).goal_threshold()
    }
}

/// Trait for dynamic-programming solvers over a grid world
pub trait GridSolver {
    /// Converged table type (cost-to-go or value function)
    type Table;

    /// Run the fixed-point iteration from the default initialization and
    /// extract the greedy policy
    fn solve(&self) -> RoboticsResult<Solution<Self::Table>>;

    /// Greedy action at `cell` given a table
    fn greedy_action(&self, table: &Self::Table, cell: GridCell) -> Action;
}
