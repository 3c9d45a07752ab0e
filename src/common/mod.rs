//! Common types, traits, and error definitions for robotics_decisions
//!
//! Shared by the joint-space planner and the grid-world solvers.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
