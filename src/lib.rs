//! Pose-Filters: Kalman filtering on rigid-body pose manifolds
//!
//! Tracks a rigid-body pose together with N of its temporal derivatives
//! (velocity, acceleration, ...) where the pose lives on the SE(2) or SE(3)
//! Lie group rather than in a flat vector space.
//!
//! # Features
//!
//! - **Manifold-Correct**: exact group composition, exponential/logarithm
//!   maps, and adjoint transport of tangent-space covariance
//! - **Derivative-Augmented**: a single filter carries the pose and an
//!   arbitrary number of stacked derivatives with their joint covariance
//! - **no_std Support**: the pose types work without an allocator; the
//!   filter itself needs `alloc`
//!
//! # Modules
//!
//! - [`geometry`]: the [`PoseSE2`](geometry::PoseSE2) and
//!   [`PoseSE3`](geometry::PoseSE3) manifold types and the
//!   [`PoseManifold`](geometry::PoseManifold) operation set
//! - [`filters`]: the [`DerivativePoseFilter`](filters::DerivativePoseFilter)
//!   and the discrete-time integrator transition builder
//! - [`types`]: fixed-dimension tangent-space aliases

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod geometry;
pub mod types;

#[cfg(feature = "alloc")]
pub mod filters;

pub mod prelude {
    pub use crate::geometry::*;
    pub use crate::types::*;

    #[cfg(feature = "alloc")]
    pub use crate::filters::*;

    pub use crate::{FilterError, Result};
}

/// Error types for the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// An input vector or matrix disagrees with the dimension its context
    /// requires. Raised before any filter state is mutated.
    DimensionMismatch {
        /// The dimension the context requires
        expected: usize,
        /// The dimension actually supplied
        actual: usize,
    },
    /// A covariance factorization failed because the matrix is not positive
    /// definite. The filter state should be considered unreliable; recovery
    /// (reinitialization) is the caller's responsibility.
    NumericalFailure,
}

#[cfg(feature = "std")]
impl std::error::Error for FilterError {}

impl ::core::fmt::Display for FilterError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            FilterError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            FilterError::NumericalFailure => {
                write!(f, "covariance is not positive definite")
            }
        }
    }
}

pub type Result<T> = ::core::result::Result<T, FilterError>;
