//! SE(2) - planar rigid transforms
//!
//! A 2D rotation + translation with 3 degrees of freedom. The tangent layout
//! is `[x, y, θ]` (translation first, rotation last); the coordinate vector
//! is `[x, y, θ]` and the homogeneous form is 3×3.

use ::core::fmt;
use ::core::ops::Mul;

use nalgebra::{Isometry2, Matrix2, Matrix3, Rotation2, UnitComplex, Vector2, Vector3};
use num_traits::Float;

#[cfg(feature = "alloc")]
use nalgebra::DMatrix;

use crate::geometry::{PoseManifold, PoseSE3};
use crate::types::{AdjointMatrix, TangentVector};
use crate::{FilterError, Result};

/// Rotation magnitude below which Taylor expansions replace the closed forms.
const SMALL_ANGLE: f64 = 1e-10;

/// A planar rigid transform on the SE(2) manifold.
///
/// Stored as a single composed isometry; the rotation is a unit complex
/// number, so it stays normalized under composition and inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSE2 {
    iso: Isometry2<f64>,
}

impl PoseSE2 {
    /// Length of the coordinate vector `[x, y, θ]`.
    pub const VECTOR_DIM: usize = 3;
    /// Degrees of freedom of the tangent space.
    pub const TANGENT_DIM: usize = 3;

    /// Creates a transform from a translation and a rotation angle.
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            iso: Isometry2::new(Vector2::new(x, y), theta),
        }
    }

    /// Creates a transform from a translation vector and a rotation value.
    pub fn from_parts(translation: Vector2<f64>, rotation: UnitComplex<f64>) -> Self {
        Self {
            iso: Isometry2::from_parts(translation.into(), rotation),
        }
    }

    /// Creates a transform from a coordinate slice `[x, y, θ]`.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if the slice does not have exactly
    /// three elements.
    pub fn from_vector(vec: &[f64]) -> Result<Self> {
        if vec.len() != Self::VECTOR_DIM {
            return Err(FilterError::DimensionMismatch {
                expected: Self::VECTOR_DIM,
                actual: vec.len(),
            });
        }
        Ok(Self::new(vec[0], vec[1], vec[2]))
    }

    /// Creates a transform from a dynamically sized 3×3 homogeneous matrix.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if the matrix is not 3×3.
    #[cfg(feature = "alloc")]
    pub fn from_matrix(mat: &DMatrix<f64>) -> Result<Self> {
        if mat.nrows() != 3 {
            return Err(FilterError::DimensionMismatch {
                expected: 3,
                actual: mat.nrows(),
            });
        }
        if mat.ncols() != 3 {
            return Err(FilterError::DimensionMismatch {
                expected: 3,
                actual: mat.ncols(),
            });
        }
        Ok(Self::from_homogeneous(&mat.fixed_view::<3, 3>(0, 0).into_owned()))
    }

    /// Creates a transform from a 3×3 homogeneous matrix.
    ///
    /// The rotation is recovered from the first column of the rotation block,
    /// so a slightly denormalized input still yields a valid rotation.
    pub fn from_homogeneous(mat: &Matrix3<f64>) -> Self {
        let angle = Float::atan2(mat[(1, 0)], mat[(0, 0)]);
        Self::new(mat[(0, 2)], mat[(1, 2)], angle)
    }

    /// Projects a spatial pose onto the ground plane: planar translation is
    /// kept, the yaw of the rotation is kept, and the out-of-plane components
    /// are dropped.
    pub fn from_se3(pose: &PoseSE3) -> Self {
        let h = pose.to_matrix();
        let angle = Float::atan2(h[(1, 0)], h[(0, 0)]);
        Self::new(h[(0, 3)], h[(1, 3)], angle)
    }

    /// The underlying isometry, for use at system boundaries.
    pub fn isometry(&self) -> Isometry2<f64> {
        self.iso
    }

    /// The translation component.
    pub fn translation(&self) -> Vector2<f64> {
        self.iso.translation.vector
    }

    /// The rotation component.
    pub fn rotation(&self) -> UnitComplex<f64> {
        self.iso.rotation
    }

    /// The rotation angle, in (−π, π].
    pub fn angle(&self) -> f64 {
        self.iso.rotation.angle()
    }

    /// The 3×3 homogeneous form of this transform.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        self.iso.to_homogeneous()
    }

    /// The coordinate vector `[x, y, θ]`.
    pub fn to_vector(&self) -> Vector3<f64> {
        let t = self.translation();
        Vector3::new(t[0], t[1], self.angle())
    }
}

impl PoseManifold<3> for PoseSE2 {
    fn identity() -> Self {
        Self {
            iso: Isometry2::identity(),
        }
    }

    fn compose(&self, rhs: &Self) -> Self {
        Self {
            iso: self.iso * rhs.iso,
        }
    }

    fn inverse(&self) -> Self {
        Self {
            iso: self.iso.inverse(),
        }
    }

    fn exp(tangent: &TangentVector<3>) -> Self {
        let rho = Vector2::new(tangent[0], tangent[1]);
        let theta = tangent[2];

        let (a, b) = if Float::abs(theta) < SMALL_ANGLE {
            (1.0 - theta * theta / 6.0, theta / 2.0)
        } else {
            (
                Float::sin(theta) / theta,
                (1.0 - Float::cos(theta)) / theta,
            )
        };
        let v = Matrix2::new(a, -b, b, a);
        let t = v * rho;

        Self::new(t[0], t[1], theta)
    }

    fn log(&self) -> TangentVector<3> {
        let theta = self.angle();
        let half = 0.5 * theta;

        // (θ/2)·cot(θ/2), the diagonal of the inverse left Jacobian
        let g = if Float::abs(theta) < SMALL_ANGLE {
            1.0 - theta * theta / 12.0
        } else {
            half * Float::cos(half) / Float::sin(half)
        };
        let v_inv = Matrix2::new(g, half, -half, g);
        let rho = v_inv * self.translation();

        Vector3::new(rho[0], rho[1], theta)
    }

    fn adjoint(&self) -> AdjointMatrix<3> {
        let rot: Rotation2<f64> = self.iso.rotation.to_rotation_matrix();
        let t = self.translation();

        let mut adj = Matrix3::identity();
        adj.fixed_view_mut::<2, 2>(0, 0).copy_from(rot.matrix());
        adj[(0, 2)] = t[1];
        adj[(1, 2)] = -t[0];
        adj
    }
}

impl Mul for PoseSE2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}

impl Default for PoseSE2 {
    fn default() -> Self {
        <Self as PoseManifold<3>>::identity()
    }
}

impl fmt::Display for PoseSE2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.to_vector();
        write!(f, "{} {} {}", v[0], v[1], v[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::core::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_exp_log_round_trip() {
        let tangent = Vector3::new(1.0, -0.5, 0.7);
        let recovered = PoseSE2::exp(&tangent).log();
        assert!((recovered - tangent).norm() < 1e-12);
    }

    #[test]
    fn test_log_exp_round_trip() {
        let pose = PoseSE2::new(2.0, -1.0, 0.3);
        let recovered = PoseSE2::exp(&pose.log());
        assert!((recovered.to_vector() - pose.to_vector()).norm() < 1e-12);
    }

    #[test]
    fn test_exp_of_zero_is_identity() {
        let pose = PoseSE2::exp(&Vector3::zeros());
        assert!((pose.to_matrix() - Matrix3::identity()).norm() < 1e-15);
    }

    #[test]
    fn test_pure_rotation_exp() {
        // A pure rotation leaves the translation at the origin
        let pose = PoseSE2::exp(&Vector3::new(0.0, 0.0, FRAC_PI_2));
        assert!(pose.translation().norm() < 1e-12);
        assert!((pose.angle() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_angle_rewraps() {
        let pose = PoseSE2::new(0.0, 0.0, 1.5 * PI);
        assert!((pose.angle() + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_compose_inverse_is_identity() {
        let pose = PoseSE2::new(1.0, 2.0, 0.5);
        let result = pose.compose(&pose.inverse());
        assert!(result.log().norm() < 1e-12);
    }

    #[test]
    fn test_adjoint_of_identity() {
        let adj = <PoseSE2 as PoseManifold<3>>::identity().adjoint();
        assert!((adj - Matrix3::identity()).norm() < 1e-15);
    }

    #[test]
    fn test_adjoint_transports_tangent() {
        // p · Exp(v) · p⁻¹ == Exp(adjoint(p) · v)
        let pose = PoseSE2::new(1.0, -2.0, 0.8);
        let tangent = Vector3::new(0.3, 0.1, -0.4);

        let lhs = pose * PoseSE2::exp(&tangent) * pose.inverse();
        let rhs = PoseSE2::exp(&(pose.adjoint() * tangent));
        assert!((lhs.to_matrix() - rhs.to_matrix()).norm() < 1e-10);
    }

    #[test]
    fn test_from_vector_wrong_length() {
        let result = PoseSE2::from_vector(&[1.0, 2.0]);
        assert_eq!(
            result,
            Err(FilterError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_from_matrix_round_trip() {
        let pose = PoseSE2::new(0.5, -1.5, 1.1);
        let mat = DMatrix::from_iterator(3, 3, pose.to_matrix().iter().copied());
        let recovered = PoseSE2::from_matrix(&mat).unwrap();
        assert!((recovered.to_vector() - pose.to_vector()).norm() < 1e-12);
    }

    #[test]
    fn test_from_matrix_wrong_shape() {
        let mat = DMatrix::zeros(2, 3);
        assert!(PoseSE2::from_matrix(&mat).is_err());
    }

    #[test]
    fn test_se3_projection() {
        let planar = PoseSE2::new(1.0, 2.0, 0.6);
        let lifted = PoseSE3::from_se2(&planar);
        let projected = PoseSE2::from_se3(&lifted);
        assert!((projected.to_vector() - planar.to_vector()).norm() < 1e-12);
    }
}
