//! The operation set shared by the pose manifold types

use ::core::fmt::Debug;
use ::core::ops::Mul;

use crate::types::{AdjointMatrix, TangentVector};

/// A Lie-group manifold of rigid transforms with tangent dimension `D`.
///
/// Implemented by [`PoseSE2`](crate::geometry::PoseSE2) (`D = 3`) and
/// [`PoseSE3`](crate::geometry::PoseSE3) (`D = 6`). The two types share no
/// data, only this operation shape; the trait exists so filters can be
/// generic over the manifold.
///
/// # Adjoint Convention
///
/// [`adjoint`](PoseManifold::adjoint) uses the left-transport convention: for
/// every pose `p` and tangent vector `v`,
///
/// ```text
/// p · Exp(v) · p⁻¹ = Exp(adjoint(p) · v)
/// ```
///
/// i.e. `adjoint(p)` re-expresses a tangent vector from the local frame of
/// `p` into the reference frame `p` is expressed in. Covariance expressed
/// locally at `p` transports as `adjoint(p) · Q · adjoint(p)ᵀ`.
pub trait PoseManifold<const D: usize>:
    Copy + PartialEq + Debug + Mul<Output = Self>
{
    /// The identity transform.
    fn identity() -> Self;

    /// Group multiplication. Associative, not commutative.
    fn compose(&self, rhs: &Self) -> Self;

    /// Group inverse; `compose(p, inverse(p))` is the identity.
    fn inverse(&self) -> Self;

    /// Exponential map from the tangent space onto the manifold.
    fn exp(tangent: &TangentVector<D>) -> Self;

    /// Logarithm map, the inverse of [`exp`](PoseManifold::exp).
    ///
    /// Defined on the principal branch of the rotation angle.
    fn log(&self) -> TangentVector<D>;

    /// The adjoint matrix of this pose (see the trait docs for the
    /// convention).
    fn adjoint(&self) -> AdjointMatrix<D>;
}
