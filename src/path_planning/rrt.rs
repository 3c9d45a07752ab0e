//! RRT (Rapidly-exploring Random Tree) planning in joint space
//!
//! Grows a tree of manipulator configurations from the start, steering
//! toward random samples (or the goal, with probability `goal_bias`) in
//! bounded per-joint steps. An edge enters the tree only if every
//! interpolated configuration along it is collision-free.

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Uniform};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arm_navigation::{angle_difference, angle_linspace, ManipulatorEnv};
use crate::common::{Configuration, DistanceMetric, RoboticsError, RoboticsResult};
use crate::path_planning::distance::L1Distance;

/// Iterations between progress log lines
const LOG_INTERVAL: usize = 1000;

/// Configuration for RRT planner
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RRTConfig {
    /// Maximum change of any joint per extension [deg]
    pub max_angle_step: f64,
    /// Maximum iterations
    pub max_iterations: usize,
    /// Probability of sampling the goal instead of a random configuration
    pub goal_bias: f64,
    /// Number of interpolated configurations checked per edge
    pub collision_check_steps: usize,
    /// Seed for `RRTPlanner::plan`; fresh entropy when unset
    pub seed: Option<u64>,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            max_angle_step: 10.0,
            max_iterations: 10_000,
            goal_bias: 0.1,
            collision_check_steps: 50,
            seed: None,
        }
    }
}

impl RRTConfig {
    pub fn validate(&self) -> RoboticsResult<()> {
        if !(self.max_angle_step > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "max_angle_step must be positive, got {}",
                self.max_angle_step
            )));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(RoboticsError::InvalidParameter(format!(
                "goal_bias must be in [0, 1], got {}",
                self.goal_bias
            )));
        }
        if self.collision_check_steps < 2 {
            return Err(RoboticsError::InvalidParameter(format!(
                "collision_check_steps must be at least 2, got {}",
                self.collision_check_steps
            )));
        }
        Ok(())
    }
}

/// Tree of configurations with parent links.
///
/// Node 0 is the root; the parent of node `i` is always an earlier node.
#[derive(Debug, Clone)]
pub struct RRTTree {
    nodes: Vec<Configuration>,
    parents: Vec<Option<usize>>,
}

impl RRTTree {
    pub fn new(root: Configuration) -> Self {
        Self {
            nodes: vec![root],
            parents: vec![None],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Configuration] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Configuration {
        &self.nodes[index]
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents[index]
    }

    fn push(&mut self, config: Configuration, parent: usize) -> usize {
        debug_assert!(parent < self.nodes.len());
        self.nodes.push(config);
        self.parents.push(Some(parent));
        self.nodes.len() - 1
    }

    /// Index of the node closest to `target`; the first one wins on ties
    pub fn nearest<M: DistanceMetric>(&self, target: &Configuration, metric: &M) -> usize {
        self.nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, node)| OrderedFloat(metric.distance(node, target)))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// Configurations from the root to `index`
    pub fn path_to(&self, index: usize) -> Vec<Configuration> {
        let mut path: Vec<Configuration> =
            std::iter::successors(Some(index), |&i| self.parents[i])
                .map(|i| self.nodes[i])
                .collect();
        path.reverse();
        path
    }
}

/// How a planning call ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanStatus {
    /// The tree was connected to the exact goal configuration
    ReachedGoal,
    /// Budget exhausted; the path ends at the tree node closest to the goal
    BestEffort { distance_to_goal: f64 },
}

/// Result of a planning call
#[derive(Debug, Clone)]
pub struct Plan {
    /// Configurations from the start to the goal (or the closest node)
    pub path: Vec<Configuration>,
    pub status: PlanStatus,
    /// Iterations consumed
    pub iterations: usize,
    pub tree: RRTTree,
}

impl Plan {
    pub fn is_success(&self) -> bool {
        self.status == PlanStatus::ReachedGoal
    }

    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }
}

/// RRT planner for the 4R manipulator
pub struct RRTPlanner<M: DistanceMetric = L1Distance> {
    env: ManipulatorEnv,
    metric: M,
    config: RRTConfig,
}

impl RRTPlanner<L1Distance> {
    /// Planner with the L1 joint metric and its default goal threshold
    pub fn with_l1(env: ManipulatorEnv, config: RRTConfig) -> RoboticsResult<Self> {
        Self::new(env, L1Distance::default(), config)
    }
}

impl<M: DistanceMetric> RRTPlanner<M> {
    pub fn new(env: ManipulatorEnv, metric: M, config: RRTConfig) -> RoboticsResult<Self> {
        config.validate()?;
        if !(metric.goal_threshold() > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "goal threshold must be positive, got {}",
                metric.goal_threshold()
            )));
        }
        Ok(Self { env, metric, config })
    }

    pub fn env(&self) -> &ManipulatorEnv {
        &self.env
    }

    pub fn config(&self) -> &RRTConfig {
        &self.config
    }

    /// Plan with an RNG seeded from the configuration
    pub fn plan(&self, start: &Configuration, goal: &Configuration) -> RoboticsResult<Plan> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.plan_with_rng(start, goal, &mut rng)
    }

    /// Plan drawing every sample from `rng`
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        start: &Configuration,
        goal: &Configuration,
        rng: &mut R,
    ) -> RoboticsResult<Plan> {
        if self.env.check_collision(start) {
            return Err(RoboticsError::PlanningError(format!(
                "start configuration {} is in collision",
                start
            )));
        }
        if self.env.check_collision(goal) {
            return Err(RoboticsError::PlanningError(format!(
                "goal configuration {} is in collision",
                goal
            )));
        }

        let goal_draw = Bernoulli::new(self.config.goal_bias)
            .map_err(|e| RoboticsError::InvalidParameter(format!("goal_bias: {}", e)))?;
        let joint_draw = Uniform::new(-180.0, 180.0);

        let mut tree = RRTTree::new(*start);

        for iteration in 0..self.config.max_iterations {
            if iteration % LOG_INTERVAL == 0 {
                debug!(
                    "RRT iteration: {}/{}, tree size: {}",
                    iteration,
                    self.config.max_iterations,
                    tree.len()
                );
            }

            let sample = if goal_draw.sample(rng) {
                *goal
            } else {
                Configuration::new(std::array::from_fn(|_| joint_draw.sample(rng)))
            };

            let nearest_ind = tree.nearest(&sample, &self.metric);
            let nearest = *tree.node(nearest_ind);
            let new_config = self.steer(&nearest, &sample);

            if !self.is_edge_free(&nearest, &new_config) {
                continue;
            }
            let new_ind = tree.push(new_config, nearest_ind);

            if self.is_goal_reached(&new_config, goal) && self.is_edge_free(&new_config, goal) {
                let goal_ind = tree.push(*goal, new_ind);
                info!(
                    "RRT: goal reached at iteration {}, tree size: {}",
                    iteration,
                    tree.len()
                );
                return Ok(Plan {
                    path: tree.path_to(goal_ind),
                    status: PlanStatus::ReachedGoal,
                    iterations: iteration + 1,
                    tree,
                });
            }
        }

        let closest = tree.nearest(goal, &self.metric);
        let distance_to_goal = self.metric.distance(tree.node(closest), goal);
        warn!(
            "RRT: max iterations ({}) reached, returning path to closest node ({:.2} from goal)",
            self.config.max_iterations, distance_to_goal
        );
        Ok(Plan {
            path: tree.path_to(closest),
            status: PlanStatus::BestEffort { distance_to_goal },
            iterations: self.config.max_iterations,
            tree,
        })
    }

    /// Move from `from` toward `to`, each joint by at most `max_angle_step`
    pub fn steer(&self, from: &Configuration, to: &Configuration) -> Configuration {
        let step = self.config.max_angle_step;
        let delta = angle_difference(to, from).map(|d| d.clamp(-step, step));
        Configuration::from_vector(from.angles() + delta)
    }

    /// Interpolate between two configurations and report whether any
    /// intermediate configuration collides, along with the sequence checked
    pub fn check_collision_between_configs(
        &self,
        from: &Configuration,
        to: &Configuration,
    ) -> (bool, Vec<Configuration>) {
        let sequence = angle_linspace(from, to, self.config.collision_check_steps);
        let collides = sequence.iter().any(|q| self.env.check_collision(q));
        (collides, sequence)
    }

    fn is_edge_free(&self, from: &Configuration, to: &Configuration) -> bool {
        let (collides, _) = self.check_collision_between_configs(from, to);
        !collides
    }

    fn is_goal_reached(&self, config: &Configuration, goal: &Configuration) -> bool {
        self.metric.distance(config, goal) < self.metric.goal_threshold()
    }
}
