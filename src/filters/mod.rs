//! Pose-filter implementations
//!
//! - [`DerivativePoseFilter`]: a Kalman filter tracking a pose manifold
//!   value and N of its temporal derivatives
//! - [`integral_matrix`]: the discrete-time multi-order integrator used as
//!   the default state transition
//! - [`gaussian_likelihood`] / [`gaussian_log_likelihood`]: Cholesky-based
//!   multivariate normal density

mod derivative_pose;
mod info;
mod integrator;
mod likelihood;

pub use derivative_pose::*;
pub use info::*;
pub use integrator::*;
pub use likelihood::*;
