//
// Planar 4R manipulator: forward kinematics and collision model
// Joint angles are in degrees, link lengths and obstacles in workspace units.
//

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{CircleObstacle, Configuration, Point2D, RoboticsError, RoboticsResult, NUM_JOINTS};

/// Geometry of the arm and the clearance required around obstacles
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArmConfig {
    /// Length of each link, base first
    pub link_lengths: [f64; NUM_JOINTS],
    /// Extra clearance added to every obstacle radius
    pub collision_threshold: f64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            link_lengths: [1.0; NUM_JOINTS],
            collision_threshold: 0.0,
        }
    }
}

impl ArmConfig {
    pub fn validate(&self) -> RoboticsResult<()> {
        if let Some(len) = self.link_lengths.iter().find(|&&l| !(l > 0.0)) {
            return Err(RoboticsError::InvalidParameter(format!(
                "link lengths must be positive, got {}",
                len
            )));
        }
        if !(self.collision_threshold >= 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "collision threshold must be non-negative, got {}",
                self.collision_threshold
            )));
        }
        Ok(())
    }
}

/// Manipulator environment: the arm plus the obstacles around it
#[derive(Debug, Clone)]
pub struct ManipulatorEnv {
    obstacles: Vec<CircleObstacle>,
    arm: ArmConfig,
}

impl ManipulatorEnv {
    /// Environment with unit links
    pub fn new(obstacles: Vec<CircleObstacle>, collision_threshold: f64) -> RoboticsResult<Self> {
        Self::with_arm(
            obstacles,
            ArmConfig {
                collision_threshold,
                ..Default::default()
            },
        )
    }

    pub fn with_arm(obstacles: Vec<CircleObstacle>, arm: ArmConfig) -> RoboticsResult<Self> {
        arm.validate()?;
        Ok(Self { obstacles, arm })
    }

    pub fn obstacles(&self) -> &[CircleObstacle] {
        &self.obstacles
    }

    pub fn arm(&self) -> &ArmConfig {
        &self.arm
    }

    /// Base followed by the endpoint of every link
    pub fn joint_positions(&self, state: &Configuration) -> [Point2D; NUM_JOINTS + 1] {
        let mut points = [Point2D::origin(); NUM_JOINTS + 1];
        let mut heading = 0.0_f64;
        for joint in 0..NUM_JOINTS {
            heading += state[joint].to_radians();
            let prev = points[joint];
            let length = self.arm.link_lengths[joint];
            points[joint + 1] = Point2D::new(
                prev.x + length * heading.cos(),
                prev.y + length * heading.sin(),
            );
        }
        points
    }

    /// End-effector position
    pub fn forward_kinematics(&self, state: &Configuration) -> Point2D {
        self.joint_positions(state)[NUM_JOINTS]
    }

    /// True if any link comes closer to an obstacle center than its
    /// radius plus the collision threshold
    pub fn check_collision(&self, state: &Configuration) -> bool {
        let joints = self.joint_positions(state);
        joints.windows(2).any(|link| {
            self.obstacles.iter().any(|obs| {
                obs.center().distance_to_segment(&link[0], &link[1])
                    < obs.radius + self.arm.collision_threshold
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_kinematics_straight_arm() {
        let env = ManipulatorEnv::new(Vec::new(), 0.0).unwrap();
        let tip = env.forward_kinematics(&Configuration::zero());
        assert_abs_diff_eq!(tip.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tip.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_joint_angles_accumulate() {
        let arm = ArmConfig {
            link_lengths: [1.0, 2.0, 1.0, 0.5],
            collision_threshold: 0.0,
        };
        let env = ManipulatorEnv::with_arm(Vec::new(), arm).unwrap();
        let joints = env.joint_positions(&Configuration::new([90.0, -90.0, 90.0, 90.0]));
        assert_abs_diff_eq!(joints[1].x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(joints[1].y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(joints[2].x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(joints[2].y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(joints[3].x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(joints[3].y, 2.0, epsilon = 1e-12);
        // Heading is now 180 degrees
        assert_abs_diff_eq!(joints[4].x, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(joints[4].y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collision_uses_threshold() {
        let obstacles = vec![CircleObstacle::new(2.0, 1.0, 0.5)];
        let straight = Configuration::zero();

        // Link passes 1.0 below the center: clear with no threshold
        let env = ManipulatorEnv::new(obstacles.clone(), 0.0).unwrap();
        assert!(!env.check_collision(&straight));

        // 0.5 + 0.6 > 1.0
        let env = ManipulatorEnv::new(obstacles, 0.6).unwrap();
        assert!(env.check_collision(&straight));
    }

    #[test]
    fn test_collision_with_distal_link_only() {
        let env = ManipulatorEnv::new(vec![CircleObstacle::new(3.0, 1.0, 0.2)], 0.0).unwrap();
        assert!(!env.check_collision(&Configuration::zero()));
        // Bend the last joint up into the obstacle
        assert!(env.check_collision(&Configuration::new([0.0, 0.0, 90.0, -90.0])));
    }

    #[test]
    fn test_invalid_arm_rejected() {
        let arm = ArmConfig {
            link_lengths: [1.0, 0.0, 1.0, 1.0],
            collision_threshold: 0.1,
        };
        assert!(ManipulatorEnv::with_arm(Vec::new(), arm).is_err());
        assert!(ManipulatorEnv::new(Vec::new(), -1.0).is_err());
    }
}
