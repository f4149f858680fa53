//! Discrete-time integrator transition blocks

use nalgebra::DMatrix;

/// Builds the discrete-time transition matrix for a chain of nested
/// integrators (position ← velocity ← acceleration ← ...) over time step
/// `dt`.
///
/// The output is a `(num_derivs + 1) · vec_dim` square block-upper-triangular
/// matrix with identity on the diagonal and `dt^k / k!` times the identity on
/// the k-th super-diagonal block. `order` limits how many super-diagonals are
/// populated: `Some(0)` yields the identity (no integration) and `None` means
/// the maximum order `num_derivs`. Orders beyond `num_derivs` contribute
/// nothing.
///
/// Pure and stateless: the same `(dt, order)` always produces the same
/// matrix.
pub fn integral_matrix(
    vec_dim: usize,
    num_derivs: usize,
    dt: f64,
    order: Option<usize>,
) -> DMatrix<f64> {
    let dim = vec_dim * (num_derivs + 1);
    let mut mat = DMatrix::identity(dim, dim);

    let order = order.unwrap_or(num_derivs).min(num_derivs);
    let mut term = 1.0;
    for o in 1..=order {
        term = term * dt / o as f64;
        for i in 0..vec_dim * (num_derivs - o + 1) {
            mat[(i, i + vec_dim * o)] = term;
        }
    }
    mat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_zero_is_identity() {
        let mat = integral_matrix(3, 2, 0.7, Some(0));
        assert_eq!(mat, DMatrix::identity(9, 9));
    }

    #[test]
    fn test_single_derivative_chain() {
        let dt = 0.5;
        let mat = integral_matrix(3, 1, dt, None);

        for i in 0..6 {
            assert_eq!(mat[(i, i)], 1.0);
        }
        for i in 0..3 {
            assert_eq!(mat[(i, i + 3)], dt);
        }
        assert_eq!(mat[(3, 0)], 0.0);
        assert_eq!(mat[(0, 4)], 0.0);
    }

    #[test]
    fn test_second_order_block_has_half_dt_squared() {
        let dt = 2.0;
        let mat = integral_matrix(2, 2, dt, None);

        // position <- velocity and velocity <- acceleration
        assert_eq!(mat[(0, 2)], dt);
        assert_eq!(mat[(2, 4)], dt);
        // position <- acceleration
        assert_eq!(mat[(0, 4)], dt * dt / 2.0);
        assert_eq!(mat[(1, 5)], dt * dt / 2.0);
    }

    #[test]
    fn test_truncated_order() {
        let dt = 1.5;
        let mat = integral_matrix(2, 2, dt, Some(1));

        assert_eq!(mat[(0, 2)], dt);
        assert_eq!(mat[(0, 4)], 0.0);
    }

    #[test]
    fn test_reproducible() {
        let a = integral_matrix(3, 1, 0.1, None);
        let b = integral_matrix(3, 1, 0.1, None);
        assert_eq!(a, b);
    }
}
