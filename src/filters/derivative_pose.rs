//! Derivative-augmented Kalman filtering on a pose manifold
//!
//! The filter tracks a pose manifold value together with N stacked temporal
//! derivatives of its tangent coordinates, and the joint covariance over the
//! `(N+1)·D`-dimensional tangent-space linearization. The mean pose is always
//! the origin of its own tangent space, so the pose block of the tangent
//! state is zero and every pose change goes through the group exponential.
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use pose_filters::filters::PlanarPoseFilter;
//!
//! // SE(2) pose plus one derivative (velocity), starting at the origin
//! let mut filter = PlanarPoseFilter::<1>::default();
//! filter
//!     .set_derivs(DVector::from_column_slice(&[1.0, 0.0, 0.0]))
//!     .unwrap();
//!
//! // Predict one second ahead with a little process noise
//! let q = DMatrix::identity(6, 6) * 0.01;
//! let info = filter.predict(&q, 1.0).unwrap();
//! assert_eq!(info.dt, 1.0);
//!
//! // One second at unit x-velocity moves the pose one unit along x
//! assert!((filter.pose().translation()[0] - 1.0).abs() < 1e-9);
//! ```

use ::core::fmt;

use alloc::boxed::Box;
use nalgebra::{Cholesky, DMatrix, DVector};

use crate::filters::info::{PredictInfo, UpdateInfo};
use crate::filters::integrator::integral_matrix;
use crate::filters::likelihood::{gaussian_likelihood, gaussian_log_likelihood};
use crate::geometry::{PoseManifold, PoseSE2, PoseSE3};
use crate::types::{to_dmatrix, CovarianceMatrix, TangentVector};
use crate::{FilterError, Result};

/// Generator of state-transition matrices from a time step.
///
/// The default is the closed-form multi-order integrator
/// ([`integral_matrix`]); replace it to model non-constant-derivative
/// dynamics. The returned matrix must be square of the filter's full state
/// dimension.
pub type TransitionMatrixFn = Box<dyn Fn(f64) -> DMatrix<f64> + Send + Sync>;

/// A Kalman filter tracking a pose manifold value and `N` derivatives.
///
/// `P` is the pose manifold, `D` its tangent dimension, and `N >= 1` the
/// number of tracked derivatives. The joint covariance is `(N+1)·D` square,
/// block-partitioned with the pose block first and the derivative blocks
/// behind it.
///
/// Every operation either completes fully or returns an error before any
/// state mutation. A filter instance is exclusively owned by its caller;
/// there is no internal synchronization.
pub struct DerivativePoseFilter<P, const D: usize, const N: usize = 1>
where
    P: PoseManifold<D>,
{
    pose: P,
    derivs: DVector<f64>,
    cov: DMatrix<f64>,
    transition_fn: TransitionMatrixFn,
}

/// A planar filter: SE(2) pose plus `N` derivatives.
pub type PlanarPoseFilter<const N: usize> = DerivativePoseFilter<PoseSE2, 3, N>;

/// A spatial filter: SE(3) pose plus `N` derivatives.
pub type SpatialPoseFilter<const N: usize> = DerivativePoseFilter<PoseSE3, 6, N>;

impl<P, const D: usize, const N: usize> DerivativePoseFilter<P, D, N>
where
    P: PoseManifold<D>,
{
    /// Tangent dimension of the pose block.
    pub const TANGENT_DIM: usize = D;
    /// Dimension of the stacked derivative vector.
    pub const DERIVS_DIM: usize = N * D;
    /// Dimension of the full augmented state and covariance.
    pub const COV_DIM: usize = (N + 1) * D;

    /// Creates a filter from an initial pose, derivative vector, and full
    /// covariance.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if `derivs` is not `N·D` long or
    /// `cov` is not `(N+1)·D` square.
    pub fn new(pose: P, derivs: DVector<f64>, cov: DMatrix<f64>) -> Result<Self> {
        if derivs.len() != Self::DERIVS_DIM {
            return Err(FilterError::DimensionMismatch {
                expected: Self::DERIVS_DIM,
                actual: derivs.len(),
            });
        }
        Self::check_square(&cov, Self::COV_DIM)?;

        Ok(Self {
            pose,
            derivs,
            cov,
            transition_fn: Self::default_transition_fn(),
        })
    }

    fn default_transition_fn() -> TransitionMatrixFn {
        Box::new(|dt| integral_matrix(D, N, dt, None))
    }

    fn check_square(mat: &DMatrix<f64>, dim: usize) -> Result<()> {
        if mat.nrows() != dim {
            return Err(FilterError::DimensionMismatch {
                expected: dim,
                actual: mat.nrows(),
            });
        }
        if mat.ncols() != dim {
            return Err(FilterError::DimensionMismatch {
                expected: dim,
                actual: mat.ncols(),
            });
        }
        Ok(())
    }

    /// The current pose estimate.
    pub fn pose(&self) -> &P {
        &self.pose
    }

    /// Replaces the pose estimate without touching the covariance.
    pub fn set_pose(&mut self, pose: P) {
        self.pose = pose;
    }

    /// The stacked derivative vector (1st..Nth derivative blocks).
    pub fn derivs(&self) -> &DVector<f64> {
        &self.derivs
    }

    /// Replaces the derivative vector.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if the length is not `N·D`.
    pub fn set_derivs(&mut self, derivs: DVector<f64>) -> Result<()> {
        if derivs.len() != Self::DERIVS_DIM {
            return Err(FilterError::DimensionMismatch {
                expected: Self::DERIVS_DIM,
                actual: derivs.len(),
            });
        }
        self.derivs = derivs;
        Ok(())
    }

    /// The pose block of the covariance, as an owned copy.
    pub fn pose_cov(&self) -> CovarianceMatrix<D> {
        self.cov.fixed_view::<D, D>(0, 0).into_owned()
    }

    /// Overwrites the pose block of the covariance.
    pub fn set_pose_cov(&mut self, cov: &CovarianceMatrix<D>) {
        self.cov.fixed_view_mut::<D, D>(0, 0).copy_from(cov);
    }

    /// The derivative block of the covariance, as an owned copy.
    pub fn derivs_cov(&self) -> DMatrix<f64> {
        self.cov
            .view((D, D), (Self::DERIVS_DIM, Self::DERIVS_DIM))
            .into_owned()
    }

    /// Overwrites the derivative block of the covariance.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if `cov` is not `N·D` square.
    pub fn set_derivs_cov(&mut self, cov: &DMatrix<f64>) -> Result<()> {
        Self::check_square(cov, Self::DERIVS_DIM)?;
        self.cov
            .view_mut((D, D), (Self::DERIVS_DIM, Self::DERIVS_DIM))
            .copy_from(cov);
        Ok(())
    }

    /// The full joint covariance.
    pub fn cov(&self) -> &DMatrix<f64> {
        &self.cov
    }

    /// Replaces the full joint covariance.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if `cov` is not `(N+1)·D` square.
    pub fn set_cov(&mut self, cov: DMatrix<f64>) -> Result<()> {
        Self::check_square(&cov, Self::COV_DIM)?;
        self.cov = cov;
        Ok(())
    }

    /// The transition-matrix-generating function.
    pub fn transition_fn(&self) -> &TransitionMatrixFn {
        &self.transition_fn
    }

    /// Replaces the transition-matrix-generating function.
    pub fn set_transition_fn(&mut self, transition_fn: TransitionMatrixFn) {
        self.transition_fn = transition_fn;
    }

    /// Tangent-state layout `[0; derivs]`: the mean pose is the origin of
    /// its own tangent space.
    fn tangent_state(&self) -> DVector<f64> {
        let mut x = DVector::zeros(Self::COV_DIM);
        x.rows_mut(D, Self::DERIVS_DIM).copy_from(&self.derivs);
        x
    }

    /// Zero-pads a derivative observation matrix into the pose columns.
    fn pad_derivs_observation(obs_matrix: &DMatrix<f64>) -> DMatrix<f64> {
        let mut full = DMatrix::zeros(obs_matrix.nrows(), Self::COV_DIM);
        full.view_mut((0, D), (obs_matrix.nrows(), Self::DERIVS_DIM))
            .copy_from(obs_matrix);
        full
    }

    fn symmetrize(&mut self) {
        self.cov = (&self.cov + self.cov.transpose()) * 0.5;
    }

    fn check_derivs_observation(
        &self,
        obs: &DVector<f64>,
        obs_matrix: &DMatrix<f64>,
        noise: &DMatrix<f64>,
    ) -> Result<()> {
        if obs.len() != obs_matrix.nrows() {
            return Err(FilterError::DimensionMismatch {
                expected: obs_matrix.nrows(),
                actual: obs.len(),
            });
        }
        if obs_matrix.ncols() != Self::DERIVS_DIM {
            return Err(FilterError::DimensionMismatch {
                expected: Self::DERIVS_DIM,
                actual: obs_matrix.ncols(),
            });
        }
        Self::check_square(noise, obs.len())
    }

    /// Displaces the pose mean by a world-frame displacement (left
    /// multiplication) and transports the pose block of the covariance by
    /// the pre-displacement adjoint, adding `noise`.
    ///
    /// The derivative block and the cross terms are left untouched; use this
    /// to relocate the filter's reference frame (e.g. a loop-closure
    /// correction) without disturbing velocity estimates.
    pub fn world_displace(&mut self, displacement: &P, noise: &CovarianceMatrix<D>) {
        let adj = self.pose.adjoint();
        self.pose = *displacement * self.pose;

        let pose_block = adj * self.cov.fixed_view::<D, D>(0, 0) * adj.transpose() + noise;
        self.cov.fixed_view_mut::<D, D>(0, 0).copy_from(&pose_block);
    }

    /// Predicts the state forward by `dt`, integrating the derivatives into
    /// an incremental pose displacement.
    ///
    /// The transition matrix comes from the filter's transition function.
    /// Its pose block is then overwritten with the adjoint of the computed
    /// displacement before covariance propagation: the integrator's pose
    /// block does not capture the linearized pose transport (it only feeds
    /// the derivative blocks, whose tangent-state rows see a zero pose
    /// block anyway).
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if `process_noise` or the
    /// transition function's output is not `(N+1)·D` square. The state is
    /// unchanged on error.
    pub fn predict(&mut self, process_noise: &DMatrix<f64>, dt: f64) -> Result<PredictInfo> {
        Self::check_square(process_noise, Self::COV_DIM)?;
        let mut transition = (self.transition_fn)(dt);
        Self::check_square(&transition, Self::COV_DIM)?;

        let state_pre = self.tangent_state();
        let cov_pre = self.cov.clone();

        let propagated = &transition * &state_pre;
        let step: TangentVector<D> = propagated.fixed_rows::<D>(D).into_owned() * dt;
        let displacement = P::exp(&step);
        transition
            .fixed_view_mut::<D, D>(0, 0)
            .copy_from(&displacement.adjoint());

        self.derivs = propagated.rows(D, Self::DERIVS_DIM).into_owned();
        self.pose = self.pose * displacement;
        self.cov = &transition * &self.cov * transition.transpose() + process_noise;
        self.symmetrize();

        Ok(PredictInfo {
            state_pre,
            cov_pre,
            state_post: self.tangent_state(),
            cov_post: self.cov.clone(),
            dt,
            process_noise: process_noise.clone(),
            transition,
        })
    }

    /// Updates the state with a linear observation of the derivative
    /// sub-state: `obs = C · derivs + noise`.
    ///
    /// `obs_matrix` has one row per observed quantity and `N·D` columns; it
    /// is zero-padded into the pose columns internally, so the observation
    /// never directly touches the pose. The covariance update uses the
    /// Joseph form.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if the observation, matrix, and
    /// noise dimensions disagree; [`FilterError::NumericalFailure`] if the
    /// innovation covariance is not positive definite. The state is
    /// unchanged on error.
    pub fn update_derivs(
        &mut self,
        obs: &DVector<f64>,
        obs_matrix: &DMatrix<f64>,
        noise: &DMatrix<f64>,
    ) -> Result<UpdateInfo> {
        self.check_derivs_observation(obs, obs_matrix, noise)?;

        let innovation = obs - obs_matrix * &self.derivs;
        let obs_full = Self::pad_derivs_observation(obs_matrix);

        let innovation_cov = &obs_full * &self.cov * obs_full.transpose() + noise;
        let chol = Cholesky::new(innovation_cov).ok_or(FilterError::NumericalFailure)?;
        let gain = &self.cov * obs_full.transpose() * chol.inverse();

        let state_pre = self.tangent_state();
        let cov_pre = self.cov.clone();

        let correction = &gain * &innovation;
        let pose_step: TangentVector<D> = correction.fixed_rows::<D>(0).into_owned();
        self.pose = self.pose * P::exp(&pose_step);
        self.derivs += correction.rows(D, Self::DERIVS_DIM);

        // Joseph form keeps the covariance positive semi-definite under
        // rounding
        let residual_gain = DMatrix::identity(Self::COV_DIM, Self::COV_DIM) - &gain * &obs_full;
        self.cov = &residual_gain * &self.cov * residual_gain.transpose()
            + &gain * noise * gain.transpose();
        self.symmetrize();

        Ok(UpdateInfo {
            state_pre,
            cov_pre,
            state_post: self.tangent_state(),
            cov_post: self.cov.clone(),
            observation: obs.clone(),
            post_residual: obs - obs_matrix * &self.derivs,
            innovation,
            obs_matrix: obs_full,
            obs_noise: noise.clone(),
        })
    }

    /// Updates the state with a direct observation of the full pose.
    ///
    /// The innovation is the manifold residual `Log(pose⁻¹ · obs)`; the
    /// observation matrix is the identity on the pose block and zero on the
    /// derivative columns. The covariance update uses the Joseph form, like
    /// [`update_derivs`](Self::update_derivs).
    ///
    /// # Errors
    /// [`FilterError::NumericalFailure`] if the innovation covariance is not
    /// positive definite. The state is unchanged on error.
    pub fn update_pose(&mut self, obs: &P, noise: &CovarianceMatrix<D>) -> Result<UpdateInfo> {
        let mut obs_full = DMatrix::zeros(D, Self::COV_DIM);
        obs_full.fixed_view_mut::<D, D>(0, 0).fill_with_identity();

        let residual = self.pose.inverse() * *obs;
        let innovation = DVector::from_column_slice(residual.log().as_slice());

        let noise_dyn = to_dmatrix(noise);
        let innovation_cov = &obs_full * &self.cov * obs_full.transpose() + &noise_dyn;
        let chol = Cholesky::new(innovation_cov).ok_or(FilterError::NumericalFailure)?;
        let gain = &self.cov * obs_full.transpose() * chol.inverse();

        let state_pre = self.tangent_state();
        let cov_pre = self.cov.clone();

        let correction = &gain * &innovation;
        let pose_step: TangentVector<D> = correction.fixed_rows::<D>(0).into_owned();
        self.pose = self.pose * P::exp(&pose_step);
        self.derivs += correction.rows(D, Self::DERIVS_DIM);

        let residual_gain = DMatrix::identity(Self::COV_DIM, Self::COV_DIM) - &gain * &obs_full;
        self.cov = &residual_gain * &self.cov * residual_gain.transpose()
            + &gain * &noise_dyn * gain.transpose();
        self.symmetrize();

        let post_residual = (self.pose.inverse() * *obs).log();

        Ok(UpdateInfo {
            state_pre,
            cov_pre,
            state_post: self.tangent_state(),
            cov_post: self.cov.clone(),
            observation: innovation.clone(),
            innovation,
            post_residual: DVector::from_column_slice(post_residual.as_slice()),
            obs_matrix: obs_full,
            obs_noise: noise_dyn,
        })
    }

    /// Gaussian density of `obs` under the predicted derivative-observation
    /// distribution. Pure query: the state is never mutated.
    ///
    /// Useful for data-association and gating decisions.
    ///
    /// # Errors
    /// Same dimension and positive-definiteness conditions as
    /// [`update_derivs`](Self::update_derivs).
    pub fn derivs_likelihood(
        &self,
        obs: &DVector<f64>,
        obs_matrix: &DMatrix<f64>,
        noise: &DMatrix<f64>,
    ) -> Result<f64> {
        let (innovation, innovation_cov) = self.derivs_innovation(obs, obs_matrix, noise)?;
        gaussian_likelihood(&innovation, &innovation_cov)
    }

    /// Log-density variant of
    /// [`derivs_likelihood`](Self::derivs_likelihood).
    pub fn derivs_log_likelihood(
        &self,
        obs: &DVector<f64>,
        obs_matrix: &DMatrix<f64>,
        noise: &DMatrix<f64>,
    ) -> Result<f64> {
        let (innovation, innovation_cov) = self.derivs_innovation(obs, obs_matrix, noise)?;
        gaussian_log_likelihood(&innovation, &innovation_cov)
    }

    fn derivs_innovation(
        &self,
        obs: &DVector<f64>,
        obs_matrix: &DMatrix<f64>,
        noise: &DMatrix<f64>,
    ) -> Result<(DVector<f64>, DMatrix<f64>)> {
        self.check_derivs_observation(obs, obs_matrix, noise)?;

        let innovation = obs - obs_matrix * &self.derivs;
        let obs_full = Self::pad_derivs_observation(obs_matrix);
        let innovation_cov = &obs_full * &self.cov * obs_full.transpose() + noise;
        Ok((innovation, innovation_cov))
    }
}

impl<P, const D: usize, const N: usize> Default for DerivativePoseFilter<P, D, N>
where
    P: PoseManifold<D>,
{
    /// Identity pose, zero derivatives, identity covariance.
    fn default() -> Self {
        Self {
            pose: P::identity(),
            derivs: DVector::zeros(Self::DERIVS_DIM),
            cov: DMatrix::identity(Self::COV_DIM, Self::COV_DIM),
            transition_fn: Self::default_transition_fn(),
        }
    }
}

impl<P, const D: usize, const N: usize> fmt::Debug for DerivativePoseFilter<P, D, N>
where
    P: PoseManifold<D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivativePoseFilter")
            .field("pose", &self.pose)
            .field("derivs", &self.derivs)
            .field("cov", &self.cov)
            .finish_non_exhaustive()
    }
}
