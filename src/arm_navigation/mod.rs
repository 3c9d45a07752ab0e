// Arm navigation module: joint-space geometry of the planar manipulator

pub mod angle;
pub mod manipulator;

pub use angle::*;
pub use manipulator::*;
