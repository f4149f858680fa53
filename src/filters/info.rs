//! Diagnostic records for filter operations
//!
//! Plain-data snapshots returned by every predict/update call. Values are
//! copied out of the filter state, never aliased into it; the filter itself
//! ignores them. External monitoring can use them for consistency checks
//! such as normalized-innovation-squared tests.
//!
//! Tangent-state vectors use the layout `[pose block; derivative blocks]`
//! with the pose block zero, since the mean pose is the origin of its own
//! tangent space.

use nalgebra::{DMatrix, DVector};

/// Snapshot of a prediction step.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictInfo {
    /// Tangent-state mean before the step
    pub state_pre: DVector<f64>,
    /// Covariance before the step
    pub cov_pre: DMatrix<f64>,
    /// Tangent-state mean after the step
    pub state_post: DVector<f64>,
    /// Covariance after the step
    pub cov_post: DMatrix<f64>,
    /// Time step used
    pub dt: f64,
    /// Process noise used
    pub process_noise: DMatrix<f64>,
    /// Effective transition matrix (pose block replaced by the displacement
    /// adjoint)
    pub transition: DMatrix<f64>,
}

/// Snapshot of an update step.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInfo {
    /// Tangent-state mean before the update
    pub state_pre: DVector<f64>,
    /// Covariance before the update
    pub cov_pre: DMatrix<f64>,
    /// Tangent-state mean after the update
    pub state_post: DVector<f64>,
    /// Covariance after the update
    pub cov_post: DMatrix<f64>,
    /// The observation, in the observation space of the update
    pub observation: DVector<f64>,
    /// Innovation (observation minus prediction) before the update
    pub innovation: DVector<f64>,
    /// Residual recomputed after the update
    pub post_residual: DVector<f64>,
    /// Effective full-state observation matrix
    pub obs_matrix: DMatrix<f64>,
    /// Observation noise used
    pub obs_noise: DMatrix<f64>,
}
