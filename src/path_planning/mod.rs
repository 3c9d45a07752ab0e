// Path Planning algorithms module

pub mod distance;
pub mod rrt;

pub use distance::*;
pub use rrt::*;
