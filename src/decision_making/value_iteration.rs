//! Value iteration for the deterministic grid world
//!
//! Computes the optimal cost-to-go
//!
//! G*(s) = min_a [ l(s, a) + G*(f(s, a)) ]
//!
//! with unit step cost for every admissible move and G*(goal) = 0, by
//! synchronous sweeps: each sweep reads only the previous table.

use log::{info, trace, warn};
use ordered_float::OrderedFloat;

use crate::common::{GridCell, GridSolver, RoboticsError, RoboticsResult};
use crate::decision_making::grid_world::{Action, GridWorld};
use crate::decision_making::solution::{Convergence, CostToGo, Policy, Solution, SolverConfig};

/// Cost of one admissible move
const STEP_COST: f64 = 1.0;

/// Deterministic value-iteration solver
pub struct ValueIteration<'a> {
    world: &'a GridWorld,
    config: SolverConfig,
}

impl<'a> ValueIteration<'a> {
    pub fn new(world: &'a GridWorld, config: SolverConfig) -> RoboticsResult<Self> {
        config.validate()?;
        Ok(Self { world, config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Goal at zero, every other cell unreachable
    pub fn initial_cost_to_go(&self) -> CostToGo {
        let mut table = CostToGo::filled(self.world.grid(), None);
        table.set(self.world.goal(), Some(0.0));
        table
    }

    /// Iterate from `initial` instead of the default initialization.
    /// The goal entry is reset to zero.
    pub fn solve_from(&self, initial: CostToGo) -> RoboticsResult<Solution<CostToGo>> {
        if !initial.matches_grid(self.world.grid()) {
            return Err(RoboticsError::InvalidParameter(
                "initial cost-to-go was computed on a different grid".to_string(),
            ));
        }
        let goal = self.world.goal();
        let mut cost = initial;
        cost.set(goal, Some(0.0));

        let mut convergence = None;
        let mut residual = f64::INFINITY;
        for iteration in 0..self.config.max_iterations {
            let mut next = cost.clone();
            residual = 0.0;
            for cell in self.world.grid().cells() {
                if cell == goal || !self.world.state_consistency_check(cell) {
                    continue;
                }
                let updated = self.backup(&cost, cell);
                residual = residual.max(change(cost.peek(cell).flatten(), updated));
                next.set(cell, updated);
            }
            cost = next;
            trace!("VI sweep {}: residual {}", iteration + 1, residual);

            if residual < self.config.tolerance {
                info!("VI converged after {} iterations", iteration + 1);
                convergence = Some(Convergence::Converged {
                    iterations: iteration + 1,
                    residual,
                });
                break;
            }
        }
        let convergence = convergence.unwrap_or_else(|| {
            warn!(
                "VI stopped at the iteration cap ({}) with residual {}",
                self.config.max_iterations, residual
            );
            Convergence::IterationCap {
                iterations: self.config.max_iterations,
                residual,
            }
        });

        let policy = self.extract_policy(&cost);
        Ok(Solution {
            table: cost,
            policy,
            convergence,
        })
    }

    /// Greedy policy for every free cell
    pub fn extract_policy(&self, cost: &CostToGo) -> Policy {
        let mut policy = Policy::filled(self.world.grid(), Action::Up);
        for cell in self.world.grid().cells() {
            if self.world.state_consistency_check(cell) {
                policy.set(cell, self.greedy_action(cost, cell));
            }
        }
        policy
    }

    /// Step cost plus cost-to-go of the successor; `None` if the move
    /// fails or the successor cannot reach the goal
    fn action_cost(&self, cost: &CostToGo, cell: GridCell, action: Action) -> Option<f64> {
        let transition = self.world.transition_function(cell, action);
        if !transition.success {
            return None;
        }
        cost.peek(transition.cell).flatten().map(|g| STEP_COST + g)
    }

    fn backup(&self, cost: &CostToGo, cell: GridCell) -> Option<f64> {
        Action::ALL
            .iter()
            .filter_map(|&action| self.action_cost(cost, cell, action))
            .min_by_key(|&c| OrderedFloat(c))
    }
}

impl GridSolver for ValueIteration<'_> {
    type Table = CostToGo;

    fn solve(&self) -> RoboticsResult<Solution<CostToGo>> {
        self.solve_from(self.initial_cost_to_go())
    }

    /// Cheapest action; failing moves rank last, ties go to the lowest
    /// action index
    fn greedy_action(&self, cost: &CostToGo, cell: GridCell) -> Action {
        Action::ALL
            .iter()
            .copied()
            .min_by_key(|&action| match self.action_cost(cost, cell, action) {
                Some(c) => (false, OrderedFloat(c)),
                None => (true, OrderedFloat(0.0)),
            })
            .unwrap_or(Action::Up)
    }
}

/// Absolute change between two entries; a flip between reachable and
/// unreachable counts as infinite
fn change(old: Option<f64>, new: Option<f64>) -> f64 {
    match (old, new) {
        (Some(a), Some(b)) => (a - b).abs(),
        (None, None) => 0.0,
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision_making::solution::RolloutEnd;
    use crate::utils::OccupancyGrid;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world_from(rows: &[&[i32]], start: (i32, i32), goal: (i32, i32)) -> GridWorld {
        let grid = OccupancyGrid::from_rows(rows).unwrap();
        GridWorld::new(grid, start.into(), goal.into(), 0.0).unwrap()
    }

    #[test]
    fn test_two_cell_grid() {
        let world = world_from(&[&[0, 0]], (0, 0), (0, 1));
        let vi = ValueIteration::new(&world, SolverConfig::default()).unwrap();
        let solution = vi.solve().unwrap();

        assert!(solution.is_converged());
        assert_eq!(solution.table.get(GridCell::new(0, 0)), Ok(Some(1.0)));
        assert_eq!(solution.table.get(GridCell::new(0, 1)), Ok(Some(0.0)));
        assert_eq!(solution.policy(GridCell::new(0, 0)), Ok(Action::Right));
    }

    #[test]
    fn test_cost_to_go_counts_steps_around_obstacles() {
        let world = world_from(
            &[&[0, 0, 0, 0], &[0, 1, 1, 0], &[0, 0, 1, 0], &[1, 0, 0, 0]],
            (2, 1),
            (0, 3),
        );
        let vi = ValueIteration::new(&world, SolverConfig::default()).unwrap();
        let solution = vi.solve().unwrap();
        let g = |r, c| solution.table.get(GridCell::new(r, c)).unwrap();

        assert_eq!(g(0, 3), Some(0.0));
        assert_eq!(g(0, 0), Some(3.0));
        assert_eq!(g(2, 0), Some(5.0));
        assert_eq!(g(2, 1), Some(6.0));
        assert_eq!(g(3, 1), Some(5.0));
        assert_eq!(g(3, 3), Some(3.0));
        assert!(solution.table.get(GridCell::new(1, 1)).is_err());
    }

    #[test]
    fn test_goal_stays_at_zero_and_unreachable_is_none() {
        // Right column is walled off from the goal
        let world = world_from(&[&[0, 1, 0], &[0, 1, 0]], (0, 0), (1, 0));
        let vi = ValueIteration::new(&world, SolverConfig::default()).unwrap();
        let solution = vi.solve().unwrap();

        assert_eq!(solution.table.get(world.goal()), Ok(Some(0.0)));
        assert_eq!(solution.table.get(GridCell::new(0, 2)), Ok(None));
        assert_eq!(solution.table.get(GridCell::new(1, 2)), Ok(None));
        assert!(solution.is_converged());
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        let world = world_from(&[&[0, 0, 0, 0, 0, 0]], (0, 0), (0, 5));
        let config = SolverConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let solution = ValueIteration::new(&world, config).unwrap().solve().unwrap();

        assert_eq!(
            solution.convergence,
            Convergence::IterationCap {
                iterations: 2,
                residual: f64::INFINITY
            }
        );
        assert_eq!(solution.table.get(GridCell::new(0, 3)), Ok(Some(2.0)));
        assert_eq!(solution.table.get(GridCell::new(0, 0)), Ok(None));
    }

    #[test]
    fn test_warm_start_from_converged_table_is_stable() {
        let world = world_from(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]], (0, 0), (2, 2));
        let vi = ValueIteration::new(&world, SolverConfig::default()).unwrap();
        let first = vi.solve().unwrap();
        let second = vi.solve_from(first.table.clone()).unwrap();

        assert_eq!(second.convergence.iterations(), 1);
        for (cell, value) in first.table.iter_free() {
            let again = second.table.get(cell).unwrap();
            match (value, again) {
                (Some(a), Some(b)) => assert_abs_diff_eq!(a, b, epsilon = 1e-6),
                (a, b) => assert_eq!(a, b),
            }
        }
    }

    #[test]
    fn test_policy_leads_to_goal() {
        let world = world_from(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]], (0, 0), (2, 2));
        let solution = ValueIteration::new(&world, SolverConfig::default())
            .unwrap()
            .solve()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let rollout = solution
            .policy
            .rollout(&world, world.start(), 20, &mut rng)
            .unwrap();

        assert_eq!(rollout.end, RolloutEnd::ReachedGoal);
        assert_eq!(rollout.cells.len(), 5);
        assert_eq!(solution.table.get(world.start()), Ok(Some(4.0)));
        assert!(matches!(
            solution.policy(GridCell::new(1, 1)),
            Err(RoboticsError::ObstacleCell(_))
        ));
        assert!(matches!(
            solution.policy(GridCell::new(3, 0)),
            Err(RoboticsError::OutOfGrid(_))
        ));
    }

    #[test]
    fn test_warm_start_on_other_grid_rejected() {
        let world = world_from(&[&[0, 0]], (0, 0), (0, 1));
        let other = world_from(&[&[0, 0, 0]], (0, 0), (0, 1));
        let vi = ValueIteration::new(&world, SolverConfig::default()).unwrap();
        let foreign = ValueIteration::new(&other, SolverConfig::default())
            .unwrap()
            .initial_cost_to_go();
        assert!(vi.solve_from(foreign).is_err());
    }
}
