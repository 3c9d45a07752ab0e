//! Grid world transition model
//!
//! A 2D occupancy grid with 4-connected moves. The deterministic model
//! either performs the move or stays put; the stochastic model executes
//! the intended move with probability `1 - epsilon` and slips to either
//! perpendicular move with probability `epsilon / 2` each.

use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::Distribution;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{GridCell, RoboticsError, RoboticsResult};
use crate::utils::OccupancyGrid;

/// 4-connected grid move. The discriminant is the action index shared by
/// every solver and policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    /// (row, column) displacement
    pub fn displacement(self) -> (i32, i32) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// The two moves at right angles to this one
    pub fn perpendicular(self) -> [Action; 2] {
        match self {
            Action::Up | Action::Down => [Action::Left, Action::Right],
            Action::Left | Action::Right => [Action::Up, Action::Down],
        }
    }
}

/// Result of a deterministic transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Destination, or the origin when the move failed
    pub cell: GridCell,
    pub success: bool,
}

/// Result of sampling one noisy step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Cell after the step; unchanged when the step was unsafe
    pub cell: GridCell,
    /// False when the sampled move hit an obstacle or left the grid
    pub safe: bool,
    pub reached_goal: bool,
}

/// Grid world: occupancy, start and goal cells and transition noise
#[derive(Debug, Clone)]
pub struct GridWorld {
    grid: OccupancyGrid,
    start: GridCell,
    goal: GridCell,
    epsilon: f64,
}

impl GridWorld {
    pub fn new(
        grid: OccupancyGrid,
        start: GridCell,
        goal: GridCell,
        epsilon: f64,
    ) -> RoboticsResult<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(RoboticsError::InvalidParameter(format!(
                "propagation probability must be in [0, 1], got {}",
                epsilon
            )));
        }
        for (name, cell) in [("start", start), ("goal", goal)] {
            if !grid.contains(cell) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "{} cell {} is outside the grid",
                    name, cell
                )));
            }
            if grid.is_occupied(cell) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "{} cell {} is an obstacle",
                    name, cell
                )));
            }
        }
        Ok(Self {
            grid,
            start,
            goal,
            epsilon,
        })
    }

    /// Same world with a different noise level, e.g. for low-noise rollouts
    pub fn with_epsilon(&self, epsilon: f64) -> RoboticsResult<Self> {
        Self::new(self.grid.clone(), self.start, self.goal, epsilon)
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn start(&self) -> GridCell {
        self.start
    }

    pub fn goal(&self) -> GridCell {
        self.goal
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        self.grid.contains(cell)
    }

    /// False if `cell` is an obstacle. Bounds are checked separately by
    /// `in_bounds`.
    pub fn state_consistency_check(&self, cell: GridCell) -> bool {
        !self.grid.is_occupied(cell)
    }

    /// In bounds and free
    pub fn is_admissible(&self, cell: GridCell) -> bool {
        self.in_bounds(cell) && self.state_consistency_check(cell)
    }

    /// Apply `action`; a blocked move leaves the agent where it was
    pub fn transition_function(&self, cell: GridCell, action: Action) -> Transition {
        let (d_row, d_col) = action.displacement();
        let next = cell.offset(d_row, d_col);
        if self.is_admissible(next) {
            Transition {
                cell: next,
                success: true,
            }
        } else {
            Transition {
                cell,
                success: false,
            }
        }
    }

    /// Candidate destinations of `action` with their probabilities.
    ///
    /// Destinations are raw: they may be obstacles or outside the grid.
    /// Zero-probability outcomes are omitted; the rest sum to one.
    pub fn probabilistic_transition_function(
        &self,
        cell: GridCell,
        action: Action,
    ) -> Vec<(GridCell, f64)> {
        let slip = self.epsilon / 2.0;
        let [side_a, side_b] = action.perpendicular();
        [(action, 1.0 - self.epsilon), (side_a, slip), (side_b, slip)]
            .into_iter()
            .filter(|&(_, p)| p > 0.0)
            .map(|(a, p)| {
                let (d_row, d_col) = a.displacement();
                (cell.offset(d_row, d_col), p)
            })
            .collect()
    }

    /// Draw one outcome of the noisy transition model
    pub fn sample_transition<R: Rng + ?Sized>(
        &self,
        cell: GridCell,
        action: Action,
        rng: &mut R,
    ) -> StepOutcome {
        let outcomes = self.probabilistic_transition_function(cell, action);
        let next = match WeightedIndex::new(outcomes.iter().map(|&(_, p)| p)) {
            Ok(dist) => outcomes[dist.sample(rng)].0,
            Err(_) => cell,
        };
        if self.is_admissible(next) {
            StepOutcome {
                cell: next,
                safe: true,
                reached_goal: next == self.goal,
            }
        } else {
            StepOutcome {
                cell,
                safe: false,
                reached_goal: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 3x3 grid with an obstacle in the middle
    fn ring_world(epsilon: f64) -> GridWorld {
        let grid = OccupancyGrid::from_rows(&[[0, 0, 0], [0, 1, 0], [0, 0, 0]]).unwrap();
        GridWorld::new(grid, GridCell::new(0, 0), GridCell::new(2, 2), epsilon).unwrap()
    }

    #[test]
    fn test_action_indices_round_trip() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(4), None);
    }

    #[test]
    fn test_state_consistency_check() {
        let world = ring_world(0.0);
        assert!(!world.state_consistency_check(GridCell::new(1, 1)));
        assert!(world.state_consistency_check(GridCell::new(0, 1)));
        // Out of bounds is a separate question
        assert!(world.state_consistency_check(GridCell::new(-1, 0)));
        assert!(!world.in_bounds(GridCell::new(-1, 0)));
    }

    #[test]
    fn test_deterministic_transition() {
        let world = ring_world(0.0);
        let origin = GridCell::new(0, 1);
        assert_eq!(
            world.transition_function(origin, Action::Right),
            Transition {
                cell: GridCell::new(0, 2),
                success: true
            }
        );
        // Into the obstacle: self-loop
        assert_eq!(
            world.transition_function(origin, Action::Down),
            Transition {
                cell: origin,
                success: false
            }
        );
        // Off the grid: self-loop
        assert_eq!(
            world.transition_function(origin, Action::Up),
            Transition {
                cell: origin,
                success: false
            }
        );
    }

    #[test]
    fn test_probabilistic_transition_sums_to_one() {
        let world = ring_world(0.4);
        let outcomes = world.probabilistic_transition_function(GridCell::new(0, 1), Action::Down);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].0, GridCell::new(1, 1));
        assert_abs_diff_eq!(outcomes[0].1, 0.6, epsilon = 1e-12);
        assert_eq!(outcomes[1].0, GridCell::new(0, 0));
        assert_eq!(outcomes[2].0, GridCell::new(0, 2));
        assert_abs_diff_eq!(outcomes[1].1, 0.2);
        let total: f64 = outcomes.iter().map(|&(_, p)| p).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noise_free_transition_has_single_outcome() {
        let world = ring_world(0.0);
        let outcomes = world.probabilistic_transition_function(GridCell::new(2, 0), Action::Left);
        assert_eq!(outcomes, vec![(GridCell::new(2, -1), 1.0)]);
    }

    #[test]
    fn test_sample_transition() {
        let mut rng = StdRng::seed_from_u64(5);
        let world = ring_world(0.0);
        let step = world.sample_transition(GridCell::new(2, 1), Action::Right, &mut rng);
        assert_eq!(
            step,
            StepOutcome {
                cell: GridCell::new(2, 2),
                safe: true,
                reached_goal: true
            }
        );
        let crash = world.sample_transition(GridCell::new(2, 1), Action::Up, &mut rng);
        assert!(!crash.safe);
        assert_eq!(crash.cell, GridCell::new(2, 1));

        // Full slip: never moves in the intended direction
        let slippery = world.with_epsilon(1.0).unwrap();
        for _ in 0..50 {
            let step = slippery.sample_transition(GridCell::new(0, 1), Action::Right, &mut rng);
            assert_ne!(step.cell, GridCell::new(0, 2));
        }
    }

    #[test]
    fn test_invalid_world_rejected() {
        let grid = OccupancyGrid::from_rows(&[[0, 1]]).unwrap();
        assert!(GridWorld::new(grid.clone(), GridCell::new(0, 0), GridCell::new(0, 1), 0.1).is_err());
        assert!(GridWorld::new(grid.clone(), GridCell::new(0, 0), GridCell::new(0, 2), 0.1).is_err());
        assert!(GridWorld::new(grid, GridCell::new(0, 0), GridCell::new(0, 0), 1.5).is_err());
    }
}
