//! Tables, policies and convergence reports shared by the grid solvers

use nalgebra::{DMatrix, Scalar};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{GridCell, RoboticsError, RoboticsResult};
use crate::decision_making::grid_world::{Action, GridWorld};
use crate::utils::OccupancyGrid;

/// Stopping rule of the fixed-point iteration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Sweeps stop once no cell changes by this much or more
    pub tolerance: f64,
    /// Hard cap on the number of sweeps
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> RoboticsResult<()> {
        if !(self.tolerance > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(RoboticsError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the fixed-point iteration ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Convergence {
    /// The last sweep changed every cell by less than the tolerance
    Converged { iterations: usize, residual: f64 },
    /// Stopped at the sweep cap; the table is the best available but not
    /// certified
    IterationCap { iterations: usize, residual: f64 },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Convergence::Converged { iterations, .. } => iterations,
            Convergence::IterationCap { iterations, .. } => iterations,
        }
    }

    /// Largest change in the final sweep
    pub fn residual(&self) -> f64 {
        match *self {
            Convergence::Converged { residual, .. } => residual,
            Convergence::IterationCap { residual, .. } => residual,
        }
    }
}

/// One entry per grid cell. Queries at obstacle or out-of-grid cells fail.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTable<T: Scalar + Copy> {
    values: DMatrix<T>,
    grid: OccupancyGrid,
}

/// Cost-to-go; `None` marks cells from which the goal is unreachable
pub type CostToGo = GridTable<Option<f64>>;

/// Expected discounted return
pub type ValueFunction = GridTable<f64>;

/// Greedy action per free cell
pub type Policy = GridTable<Action>;

impl<T: Scalar + Copy> GridTable<T> {
    /// Table over `grid` with every entry set to `value`
    pub fn filled(grid: &OccupancyGrid, value: T) -> Self {
        let (nrows, ncols) = grid.shape();
        Self {
            values: DMatrix::from_element(nrows, ncols, value),
            grid: grid.clone(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Raw matrix, obstacle entries included
    pub fn values(&self) -> &DMatrix<T> {
        &self.values
    }

    /// Entry at a free in-grid cell
    pub fn get(&self, cell: GridCell) -> RoboticsResult<T> {
        let index = self
            .grid
            .index_of(cell)
            .ok_or(RoboticsError::OutOfGrid(cell))?;
        if self.grid[index] {
            return Err(RoboticsError::ObstacleCell(cell));
        }
        Ok(self.values[index])
    }

    /// Entry at any in-grid cell, obstacles included
    pub(crate) fn peek(&self, cell: GridCell) -> Option<T> {
        self.grid.index_of(cell).map(|index| self.values[index])
    }

    pub(crate) fn set(&mut self, cell: GridCell, value: T) {
        if let Some(index) = self.grid.index_of(cell) {
            self.values[index] = value;
        }
    }

    /// Free cells with their entries, row-major
    pub fn iter_free(&self) -> impl Iterator<Item = (GridCell, T)> + '_ {
        self.grid
            .cells()
            .filter(move |&cell| !self.grid.is_occupied(cell))
            .filter_map(move |cell| self.peek(cell).map(|value| (cell, value)))
    }

    pub(crate) fn matches_grid(&self, grid: &OccupancyGrid) -> bool {
        self.grid == *grid
    }
}

impl Policy {
    /// Action at `cell`
    pub fn action(&self, cell: GridCell) -> RoboticsResult<Action> {
        self.get(cell)
    }

    /// Follow the policy through the noisy model of `world` from `from`,
    /// stopping at the goal, on a crash or after `max_steps`
    pub fn rollout<R: Rng + ?Sized>(
        &self,
        world: &GridWorld,
        from: GridCell,
        max_steps: usize,
        rng: &mut R,
    ) -> RoboticsResult<Rollout> {
        let mut cells = vec![from];
        if from == world.goal() {
            return Ok(Rollout {
                cells,
                end: RolloutEnd::ReachedGoal,
            });
        }
        let mut cell = from;
        for _ in 0..max_steps {
            let step = world.sample_transition(cell, self.action(cell)?, rng);
            if !step.safe {
                return Ok(Rollout {
                    cells,
                    end: RolloutEnd::Collision,
                });
            }
            cell = step.cell;
            cells.push(cell);
            if step.reached_goal {
                return Ok(Rollout {
                    cells,
                    end: RolloutEnd::ReachedGoal,
                });
            }
        }
        Ok(Rollout {
            cells,
            end: RolloutEnd::StepLimit,
        })
    }
}

/// Why a rollout stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutEnd {
    ReachedGoal,
    Collision,
    StepLimit,
}

/// Cells visited by a policy rollout, first cell included
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    pub cells: Vec<GridCell>,
    pub end: RolloutEnd,
}

/// Output of a grid solver
#[derive(Debug, Clone)]
pub struct Solution<T> {
    pub table: T,
    pub policy: Policy,
    pub convergence: Convergence,
}

impl<T> Solution<T> {
    /// Action the policy takes at `cell`
    pub fn policy(&self, cell: GridCell) -> RoboticsResult<Action> {
        self.policy.action(cell)
    }

    pub fn is_converged(&self) -> bool {
        self.convergence.is_converged()
    }
}
