// =============================================================================
// ndarray → nalgebra Conversion Utilities
// =============================================================================
//
// Arrays live in ndarray throughout the crate. The few decompositions that
// ndarray does not provide go through nalgebra, and the conversions are kept
// here instead of being repeated at each call site.
//
// =============================================================================

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::ArrayView2;

use crate::error::{PathError, Result};

/// Convert an ndarray matrix view to a nalgebra DMatrix.
///
/// Works for any memory layout; elements are read in logical row-major order.
#[inline]
pub fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_row_iterator(a.nrows(), a.ncols(), a.iter().copied())
}

// =============================================================================
// Decompositions
// =============================================================================

/// Largest eigenvalue of a symmetric matrix.
///
/// Only the lower triangle is read. Returns 0.0 for an empty matrix.
pub fn largest_symmetric_eigenvalue(a: ArrayView2<'_, f64>) -> Result<f64> {
    if a.nrows() != a.ncols() {
        return Err(PathError::DimensionMismatch(format!(
            "eigenvalue requested for a {}x{} matrix",
            a.nrows(),
            a.ncols()
        )));
    }
    if a.is_empty() {
        return Ok(0.0);
    }

    let eigen = SymmetricEigen::try_new(to_dmatrix(a), f64::EPSILON, 0).ok_or_else(|| {
        PathError::LinearAlgebra("symmetric eigen-decomposition did not converge".to_string())
    })?;

    Ok(eigen
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_transposed_view_keeps_logical_order() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let m = to_dmatrix(a.t());
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m[(0, 1)], 4.0);
        assert_eq!(m[(2, 0)], 3.0);
    }

    #[test]
    fn test_largest_eigenvalue_diagonal() {
        let a = array![[2.0, 0.0, 0.0], [0.0, 7.0, 0.0], [0.0, 0.0, 3.0]];
        let d = largest_symmetric_eigenvalue(a.view()).unwrap();
        assert_abs_diff_eq!(d, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_largest_eigenvalue_dense() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let d = largest_symmetric_eigenvalue(a.view()).unwrap();
        assert_abs_diff_eq!(d, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_largest_eigenvalue_rejects_rectangular() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            largest_symmetric_eigenvalue(a.view()),
            Err(PathError::DimensionMismatch(_))
        ));
    }
}
