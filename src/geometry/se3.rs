//! SE(3) - spatial rigid transforms
//!
//! A 3D rotation + translation with 6 degrees of freedom. The tangent layout
//! is `[x, y, z, φx, φy, φz]` (translation first, rotation last); the
//! coordinate vector is `[x, y, z, qw, qx, qy, qz]` and the homogeneous form
//! is 4×4.

use ::core::fmt;
use ::core::ops::Mul;

use nalgebra::{
    Isometry3, Matrix3, Matrix4, Quaternion, Rotation3, SVector, Translation3, UnitQuaternion,
    Vector3, Vector6,
};
use num_traits::Float;

#[cfg(feature = "alloc")]
use nalgebra::DMatrix;

use crate::geometry::{PoseManifold, PoseSE2};
use crate::types::{AdjointMatrix, TangentVector};
use crate::{FilterError, Result};

/// Rotation magnitude below which Taylor expansions replace the closed forms.
const SMALL_ANGLE: f64 = 1e-10;

/// Skew-symmetric (cross-product) matrix of a 3-vector.
fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v[2], v[1], v[2], 0.0, -v[0], -v[1], v[0], 0.0)
}

/// A spatial rigid transform on the SE(3) manifold.
///
/// Stored as a single composed isometry; the rotation is a unit quaternion,
/// so it stays normalized under composition and inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSE3 {
    iso: Isometry3<f64>,
}

impl PoseSE3 {
    /// Length of the coordinate vector `[x, y, z, qw, qx, qy, qz]`.
    pub const VECTOR_DIM: usize = 7;
    /// Degrees of freedom of the tangent space.
    pub const TANGENT_DIM: usize = 6;

    /// Creates a transform from explicit translation and quaternion
    /// components. The quaternion is normalized on construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(x: f64, y: f64, z: f64, qw: f64, qx: f64, qy: f64, qz: f64) -> Self {
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz));
        Self {
            iso: Isometry3::from_parts(Translation3::new(x, y, z), rotation),
        }
    }

    /// Creates a transform from a translation vector and a rotation value.
    pub fn from_parts(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    /// Creates a transform from a coordinate slice `[x, y, z, qw, qx, qy, qz]`.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] if the slice does not have exactly
    /// seven elements.
    pub fn from_vector(vec: &[f64]) -> Result<Self> {
        if vec.len() != Self::VECTOR_DIM {
            return Err(FilterError::DimensionMismatch {
                expected: Self::VECTOR_DIM,
                actual: vec.len(),
            });
        }
        Ok(Self::new(
            vec[0], vec[1], vec[2], vec[3], vec[4], vec[5], vec[6],
        ))
    }

    /// Creates a transform from a dynamically sized matrix: either a 4×4
    /// homogeneous transform or a 3×3 rotation with zero translation.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] for any other shape.
    #[cfg(feature = "alloc")]
    pub fn from_matrix(mat: &DMatrix<f64>) -> Result<Self> {
        if mat.nrows() == 4 && mat.ncols() == 4 {
            Ok(Self::from_homogeneous(
                &mat.fixed_view::<4, 4>(0, 0).into_owned(),
            ))
        } else if mat.nrows() == 3 && mat.ncols() == 3 {
            Ok(Self::from_rotation(
                &mat.fixed_view::<3, 3>(0, 0).into_owned(),
            ))
        } else {
            Err(FilterError::DimensionMismatch {
                expected: 16,
                actual: mat.nrows() * mat.ncols(),
            })
        }
    }

    /// Creates a transform from a 4×4 homogeneous matrix.
    ///
    /// The rotation block is re-orthonormalized, so a slightly denormalized
    /// input still yields a valid rotation.
    pub fn from_homogeneous(mat: &Matrix4<f64>) -> Self {
        let rotation = Rotation3::from_matrix(&mat.fixed_view::<3, 3>(0, 0).into_owned());
        let translation = Vector3::new(mat[(0, 3)], mat[(1, 3)], mat[(2, 3)]);
        Self::from_parts(translation, UnitQuaternion::from_rotation_matrix(&rotation))
    }

    /// Creates a rotation-only transform from a 3×3 rotation matrix.
    pub fn from_rotation(rot: &Matrix3<f64>) -> Self {
        let rotation = Rotation3::from_matrix(rot);
        Self::from_parts(Vector3::zeros(), UnitQuaternion::from_rotation_matrix(&rotation))
    }

    /// Lifts a planar pose into the spatial manifold at zero height, roll,
    /// and pitch.
    pub fn from_se2(pose: &PoseSE2) -> Self {
        let t = pose.translation();
        Self::from_parts(
            Vector3::new(t[0], t[1], 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), pose.angle()),
        )
    }

    /// The underlying isometry, for use at system boundaries.
    pub fn isometry(&self) -> Isometry3<f64> {
        self.iso
    }

    /// The translation component.
    pub fn translation(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    /// The rotation component.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    /// The 4×4 homogeneous form of this transform.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        self.iso.to_homogeneous()
    }

    /// The coordinate vector `[x, y, z, qw, qx, qy, qz]`.
    pub fn to_vector(&self) -> SVector<f64, 7> {
        let t = self.translation();
        let q = self.iso.rotation;
        SVector::<f64, 7>::from([t[0], t[1], t[2], q.w, q.i, q.j, q.k])
    }
}

impl PoseManifold<6> for PoseSE3 {
    fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
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

    fn exp(tangent: &TangentVector<6>) -> Self {
        let rho = tangent.fixed_rows::<3>(0).into_owned();
        let phi = tangent.fixed_rows::<3>(3).into_owned();
        let theta = phi.norm();

        let k = skew(&phi);
        // Left Jacobian of SO(3) maps the translational tangent component
        // onto the group translation
        let v = if theta < SMALL_ANGLE {
            Matrix3::identity() + 0.5 * k + (k * k) / 6.0
        } else {
            let theta_sq = theta * theta;
            Matrix3::identity()
                + ((1.0 - Float::cos(theta)) / theta_sq) * k
                + ((theta - Float::sin(theta)) / (theta_sq * theta)) * (k * k)
        };

        Self::from_parts(v * rho, UnitQuaternion::from_scaled_axis(phi))
    }

    fn log(&self) -> TangentVector<6> {
        let phi = self.iso.rotation.scaled_axis();
        let theta = phi.norm();

        let k = skew(&phi);
        let v_inv = if theta < SMALL_ANGLE {
            Matrix3::identity() - 0.5 * k + (k * k) / 12.0
        } else {
            let half = 0.5 * theta;
            let coeff =
                (1.0 - half * Float::cos(half) / Float::sin(half)) / (theta * theta);
            Matrix3::identity() - 0.5 * k + coeff * (k * k)
        };
        let rho = v_inv * self.translation();

        let mut out = Vector6::zeros();
        out.fixed_rows_mut::<3>(0).copy_from(&rho);
        out.fixed_rows_mut::<3>(3).copy_from(&phi);
        out
    }

    fn adjoint(&self) -> AdjointMatrix<6> {
        let rot = self.iso.rotation.to_rotation_matrix();
        let r = rot.matrix();
        let t = self.translation();

        let mut adj = AdjointMatrix::<6>::zeros();
        adj.fixed_view_mut::<3, 3>(0, 0).copy_from(r);
        adj.fixed_view_mut::<3, 3>(3, 3).copy_from(r);
        adj.fixed_view_mut::<3, 3>(0, 3).copy_from(&(skew(&t) * r));
        adj
    }
}

impl Mul for PoseSE3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}

impl Default for PoseSE3 {
    fn default() -> Self {
        <Self as PoseManifold<6>>::identity()
    }
}

impl fmt::Display for PoseSE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.to_vector();
        write!(
            f,
            "{} {} {} {} {} {} {}",
            v[0], v[1], v[2], v[3], v[4], v[5], v[6]
        )
    }
}
