//! Pose manifold types for rigid-body transforms
//!
//! This module provides the planar ([`PoseSE2`]) and spatial ([`PoseSE3`])
//! rigid transforms as Lie-group value types, the [`PoseManifold`] operation
//! set shared by both, and Euler-angle conversion helpers.

mod euler;
mod manifold;
mod se2;
mod se3;

pub use euler::*;
pub use manifold::*;
pub use se2::*;
pub use se3::*;
