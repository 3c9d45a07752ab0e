//! In-memory scene descriptions handed to the planners and solvers.
//!
//! Loading them from disk is left to the caller; with the `serde` feature
//! they deserialize from any serde format.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arm_navigation::{ArmConfig, ManipulatorEnv};
use crate::common::{CircleObstacle, Configuration, GridCell, RoboticsResult};
use crate::decision_making::GridWorld;
use crate::utils::OccupancyGrid;

/// Manipulator planning problem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManipulatorScene {
    pub start: Configuration,
    pub goal: Configuration,
    pub obstacles: Vec<CircleObstacle>,
    pub collision_threshold: f64,
    /// Unit links when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub link_lengths: Option<[f64; 4]>,
}

impl ManipulatorScene {
    pub fn environment(&self) -> RoboticsResult<ManipulatorEnv> {
        let arm = ArmConfig {
            link_lengths: self
                .link_lengths
                .unwrap_or(ArmConfig::default().link_lengths),
            collision_threshold: self.collision_threshold,
        };
        ManipulatorEnv::with_arm(self.obstacles.clone(), arm)
    }
}

/// Grid-world decision problem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridScene {
    pub occupancy: OccupancyGrid,
    pub start: GridCell,
    pub goal: GridCell,
    /// Propagation probability
    pub epsilon: f64,
}

impl GridScene {
    pub fn world(&self) -> RoboticsResult<GridWorld> {
        GridWorld::new(self.occupancy.clone(), self.start, self.goal, self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manipulator_scene_builds_env() {
        let scene = ManipulatorScene {
            start: Configuration::zero(),
            goal: Configuration::new([90.0, 0.0, 0.0, 0.0]),
            obstacles: vec![CircleObstacle::new(2.0, 2.0, 0.5)],
            collision_threshold: 0.1,
            link_lengths: None,
        };
        let env = scene.environment().unwrap();
        assert_eq!(env.obstacles().len(), 1);
        assert_eq!(env.arm().link_lengths, [1.0; 4]);
        assert!(!env.check_collision(&scene.start));
    }

    #[test]
    fn test_grid_scene_validates() {
        let scene = GridScene {
            occupancy: OccupancyGrid::from_rows(&[[0, 0], [1, 0]]).unwrap(),
            start: GridCell::new(1, 0),
            goal: GridCell::new(0, 1),
            epsilon: 0.1,
        };
        assert!(scene.world().is_err());
        let scene = GridScene {
            start: GridCell::new(0, 0),
            ..scene
        };
        assert_eq!(scene.world().unwrap().goal(), GridCell::new(0, 1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_manipulator_scene_from_json() {
        let json = r#"{
            "start": [0.0, 0.0, 0.0, 190.0],
            "goal": [90.0, 0.0, 0.0, 0.0],
            "obstacles": [{"x": 2.0, "y": 2.0, "radius": 0.5}],
            "collision_threshold": 0.05
        }"#;
        let scene: ManipulatorScene = serde_json::from_str(json).unwrap();
        // Angles are normalized on the way in
        assert_eq!(scene.start[3], -170.0);
        assert_eq!(scene.link_lengths, None);
        assert_eq!(scene.obstacles[0], CircleObstacle::new(2.0, 2.0, 0.5));
    }
}
