//! Value iteration for the stochastic grid world
//!
//! Each action moves as intended with probability `1 - epsilon` and slips
//! sideways otherwise. Arriving at the goal pays +1, leaving the grid or
//! hitting an obstacle pays -1 and ends the episode; both rewards arrive
//! one step later and are discounted by `gamma`:
//!
//! V*(s) = max_a sum_s' P(s' | s, a) * gamma * u(s')
//!
//! where u(s') is the terminal reward for goal and crash outcomes and
//! V*(s') otherwise.

use std::cmp::Reverse;

use log::{info, trace, warn};
use ordered_float::OrderedFloat;

use crate::common::{GridCell, GridSolver, RoboticsError, RoboticsResult};
use crate::decision_making::grid_world::{Action, GridWorld};
use crate::decision_making::solution::{Convergence, Policy, Solution, SolverConfig, ValueFunction};

/// Default discount factor
pub const DEFAULT_GAMMA: f64 = 0.99;

/// Reward for arriving at the goal, also its pinned value
const GOAL_REWARD: f64 = 1.0;

/// Reward for a move into an obstacle or off the grid
const CRASH_REWARD: f64 = -1.0;

/// Stochastic value-iteration solver
pub struct Mdp<'a> {
    world: &'a GridWorld,
    gamma: f64,
    config: SolverConfig,
}

impl<'a> Mdp<'a> {
    pub fn new(world: &'a GridWorld, gamma: f64, config: SolverConfig) -> RoboticsResult<Self> {
        config.validate()?;
        if !(0.0..1.0).contains(&gamma) {
            return Err(RoboticsError::InvalidParameter(format!(
                "discount factor must be in [0, 1), got {}",
                gamma
            )));
        }
        Ok(Self { world, gamma, config })
    }

    /// Solver with `DEFAULT_GAMMA` and the default stopping rule
    pub fn with_defaults(world: &'a GridWorld) -> RoboticsResult<Self> {
        Self::new(world, DEFAULT_GAMMA, SolverConfig::default())
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Goal at one, every other cell at zero
    pub fn initial_values(&self) -> ValueFunction {
        let mut values = ValueFunction::filled(self.world.grid(), 0.0);
        values.set(self.world.goal(), GOAL_REWARD);
        values
    }

    /// Iterate from `initial` instead of the default initialization.
    /// The goal entry is reset to its reward.
    pub fn solve_from(&self, initial: ValueFunction) -> RoboticsResult<Solution<ValueFunction>> {
        if !initial.matches_grid(self.world.grid()) {
            return Err(RoboticsError::InvalidParameter(
                "initial value function was computed on a different grid".to_string(),
            ));
        }
        let goal = self.world.goal();
        let mut values = initial;
        values.set(goal, GOAL_REWARD);

        let mut convergence = None;
        let mut residual = f64::INFINITY;
        for iteration in 0..self.config.max_iterations {
            let mut next = values.clone();
            residual = 0.0;
            for cell in self.world.grid().cells() {
                if cell == goal || !self.world.state_consistency_check(cell) {
                    continue;
                }
                let updated = Action::ALL
                    .iter()
                    .map(|&action| self.expected_return(&values, cell, action))
                    .fold(f64::NEG_INFINITY, f64::max);
                let old = values.peek(cell).unwrap_or(0.0);
                residual = residual.max((updated - old).abs());
                next.set(cell, updated);
            }
            values = next;
            trace!("MDP sweep {}: residual {}", iteration + 1, residual);

            if residual < self.config.tolerance {
                info!("MDP converged after {} iterations", iteration + 1);
                convergence = Some(Convergence::Converged {
                    iterations: iteration + 1,
                    residual,
                });
                break;
            }
        }
        let convergence = convergence.unwrap_or_else(|| {
            warn!(
                "MDP stopped at the iteration cap ({}) with residual {}",
                self.config.max_iterations, residual
            );
            Convergence::IterationCap {
                iterations: self.config.max_iterations,
                residual,
            }
        });

        let policy = self.extract_policy(&values);
        Ok(Solution {
            table: values,
            policy,
            convergence,
        })
    }

    /// Greedy policy for every free cell
    pub fn extract_policy(&self, values: &ValueFunction) -> Policy {
        let mut policy = Policy::filled(self.world.grid(), Action::Up);
        for cell in self.world.grid().cells() {
            if self.world.state_consistency_check(cell) {
                policy.set(cell, self.greedy_action(values, cell));
            }
        }
        policy
    }

    /// Expected discounted return of taking `action` in `cell`
    pub fn expected_return(&self, values: &ValueFunction, cell: GridCell, action: Action) -> f64 {
        self.world
            .probabilistic_transition_function(cell, action)
            .into_iter()
            .map(|(next, p)| p * self.gamma * self.outcome_value(values, next))
            .sum()
    }

    fn outcome_value(&self, values: &ValueFunction, next: GridCell) -> f64 {
        if !self.world.is_admissible(next) {
            CRASH_REWARD
        } else if next == self.world.goal() {
            GOAL_REWARD
        } else {
            values.peek(next).unwrap_or(0.0)
        }
    }
}

impl GridSolver for Mdp<'_> {
    type Table = ValueFunction;

    fn solve(&self) -> RoboticsResult<Solution<ValueFunction>> {
        self.solve_from(self.initial_values())
    }

    /// Action with the highest expected return, ties go to the lowest
    /// action index
    fn greedy_action(&self, values: &ValueFunction, cell: GridCell) -> Action {
        Action::ALL
            .iter()
            .copied()
            .min_by_key(|&action| Reverse(OrderedFloat(self.expected_return(values, cell, action))))
            .unwrap_or(Action::Up)
    }
}
