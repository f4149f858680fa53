//! Multivariate Gaussian density evaluation

use ::core::f64::consts::PI;

use nalgebra::{Cholesky, DMatrix, DVector};
use num_traits::Float;

use crate::{FilterError, Result};

/// Computes the multivariate Gaussian density of `z` under `covariance`.
///
/// p(z) = (2π)^(-M/2) |S|^(-1/2) exp(-0.5 · zᵀ S⁻¹ z)
///
/// The covariance is factorized by Cholesky decomposition: the determinant
/// comes from the factor's diagonal and the Mahalanobis term from a
/// triangular solve.
///
/// # Errors
/// [`FilterError::DimensionMismatch`] if `covariance` is not square of `z`'s
/// length; [`FilterError::NumericalFailure`] if it is not positive definite.
pub fn gaussian_likelihood(z: &DVector<f64>, covariance: &DMatrix<f64>) -> Result<f64> {
    Ok(Float::exp(gaussian_log_likelihood(z, covariance)?))
}

/// Computes the log of the multivariate Gaussian density of `z` under
/// `covariance`.
///
/// Same contract as [`gaussian_likelihood`] without the final
/// exponentiation, for magnitudes where the density underflows.
pub fn gaussian_log_likelihood(z: &DVector<f64>, covariance: &DMatrix<f64>) -> Result<f64> {
    let dim = z.len();
    if covariance.nrows() != dim {
        return Err(FilterError::DimensionMismatch {
            expected: dim,
            actual: covariance.nrows(),
        });
    }
    if covariance.ncols() != dim {
        return Err(FilterError::DimensionMismatch {
            expected: dim,
            actual: covariance.ncols(),
        });
    }

    let chol = Cholesky::new(covariance.clone()).ok_or(FilterError::NumericalFailure)?;
    let factor = chol.l();

    // log det(S) = 2 · Σ log L_ii
    let mut log_det = 0.0;
    for i in 0..dim {
        log_det += 2.0 * Float::ln(factor[(i, i)]);
    }

    // Solve L y = z, then zᵀ S⁻¹ z = ‖y‖²
    let y = factor
        .solve_lower_triangular(z)
        .ok_or(FilterError::NumericalFailure)?;
    let mahal_sq = y.norm_squared();

    Ok(-0.5 * (mahal_sq + log_det + dim as f64 * Float::ln(2.0 * PI)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_normal_at_origin() {
        let z = DVector::zeros(2);
        let cov = DMatrix::identity(2, 2);

        let density = gaussian_likelihood(&z, &cov).unwrap();
        assert!((density - 1.0 / (2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_density_decreases_away_from_mean() {
        let cov = DMatrix::identity(3, 3);
        let near = gaussian_likelihood(&DVector::from_column_slice(&[0.1, 0.0, 0.0]), &cov);
        let far = gaussian_likelihood(&DVector::from_column_slice(&[3.0, 0.0, 0.0]), &cov);
        assert!(near.unwrap() > far.unwrap());
    }

    #[test]
    fn test_log_likelihood_matches_likelihood() {
        let z = DVector::from_column_slice(&[0.5, -0.25]);
        let cov = DMatrix::from_row_slice(2, 2, &[2.0, 0.3, 0.3, 1.0]);

        let density = gaussian_likelihood(&z, &cov).unwrap();
        let log_density = gaussian_log_likelihood(&z, &cov).unwrap();
        assert!((Float::ln(density) - log_density).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_definite_fails() {
        let z = DVector::zeros(2);
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert_eq!(
            gaussian_likelihood(&z, &cov),
            Err(FilterError::NumericalFailure)
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let z = DVector::zeros(3);
        let cov = DMatrix::identity(2, 2);
        assert_eq!(
            gaussian_likelihood(&z, &cov),
            Err(FilterError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
