// Decision making module: dynamic programming over a discrete grid world

pub mod grid_world;
pub mod solution;
pub mod value_iteration;
pub mod mdp;

pub use grid_world::*;
pub use solution::*;
pub use value_iteration::*;
pub use mdp::*;
