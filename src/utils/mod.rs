//! Utility modules for robotics_decisions

pub mod grid_map;

pub use grid_map::*;
