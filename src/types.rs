//! Fixed-dimension tangent-space aliases
//!
//! The pose manifolds have compile-time-known tangent dimensions (3 for the
//! planar group, 6 for the spatial group), so their vectors and matrices are
//! statically sized. The derivative-augmented filter state has dimension
//! `(N+1)·D`, which stable Rust cannot form from const generics, so the
//! filter side of the crate works with dynamically sized matrices instead.

use nalgebra::{SMatrix, SVector};

#[cfg(feature = "alloc")]
use nalgebra::DMatrix;

/// A minimal-coordinate tangent vector of a pose manifold.
pub type TangentVector<const D: usize> = SVector<f64, D>;

/// A covariance matrix over a tangent space.
pub type CovarianceMatrix<const D: usize> = SMatrix<f64, D, D>;

/// An adjoint (tangent-transport) matrix of a pose manifold.
pub type AdjointMatrix<const D: usize> = SMatrix<f64, D, D>;

/// Widens a fixed-size matrix into a dynamically sized copy.
///
/// Used where a fixed-dimension argument meets the filter's dynamic state.
#[cfg(feature = "alloc")]
pub fn to_dmatrix<const R: usize, const C: usize>(mat: &SMatrix<f64, R, C>) -> DMatrix<f64> {
    DMatrix::from_iterator(R, C, mat.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dmatrix_preserves_layout() {
        let fixed = SMatrix::<f64, 2, 3>::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let dynamic = to_dmatrix(&fixed);

        assert_eq!(dynamic.nrows(), 2);
        assert_eq!(dynamic.ncols(), 3);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(dynamic[(i, j)], fixed[(i, j)]);
            }
        }
    }
}
