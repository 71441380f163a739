// =============================================================================
// Path Output
// =============================================================================
//
// Sparse assembly of the coefficient path and the fitted-path result.
//
// =============================================================================

use ndarray::{Array1, Array2};
use sprs::{CsMat, CsVec, TriMat};

use crate::error::{PathError, Result};

/// Collects per-λ solutions into a `(p+1) × nλ` sparse matrix.
pub(crate) struct PathBuilder {
    triplets: TriMat<f64>,
}

impl PathBuilder {
    /// `nnz_per_column` only sizes the initial allocation; columns may hold more.
    pub(crate) fn new(n_rows: usize, n_lambda: usize, nnz_per_column: usize) -> Self {
        Self {
            triplets: TriMat::with_capacity((n_rows, n_lambda), n_lambda * nnz_per_column),
        }
    }

    /// Write one solution into column `col`.
    ///
    /// Normally row 0 gets `beta0` and coefficient `j` lands in row `j + 1`.
    /// When `intercept_in_coef` is set the coefficient vector already starts
    /// with the intercept, so it is written from row 0 and `beta0` is unused.
    pub(crate) fn write_column(
        &mut self,
        col: usize,
        beta0: f64,
        coef: &CsVec<f64>,
        intercept_in_coef: bool,
    ) {
        let offset = if intercept_in_coef {
            0
        } else {
            self.triplets.add_triplet(0, col, beta0);
            1
        };
        for (j, &v) in coef.iter() {
            self.triplets.add_triplet(j + offset, col, v);
        }
    }

    pub(crate) fn finish(self) -> CsMat<f64> {
        self.triplets.to_csc()
    }
}

/// A fitted regularization path.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// The λ values actually used, in caller units.
    pub lambda: Array1<f64>,
    /// Coefficient path in CSC layout: `(p+1) × nλ`, row 0 is the intercept.
    pub beta: CsMat<f64>,
    /// Solver iterations used at each λ.
    pub iterations: Vec<usize>,
    /// The iteration cap each λ ran under.
    pub max_iterations: usize,
}

impl PathResult {
    pub fn n_lambda(&self) -> usize {
        self.lambda.len()
    }

    /// Rows of the path: the intercept plus one per predictor.
    pub fn n_coefficients(&self) -> usize {
        self.beta.rows()
    }

    /// Dense coefficient column `k`, intercept first.
    pub fn coefficients(&self, k: usize) -> Result<Array1<f64>> {
        let column = self.beta.outer_view(k).ok_or_else(|| {
            PathError::InvalidValue(format!(
                "lambda index {} out of range for a path of {} values",
                k,
                self.n_lambda()
            ))
        })?;
        let mut dense = Array1::zeros(self.n_coefficients());
        for (i, &v) in column.iter() {
            dense[i] = v;
        }
        Ok(dense)
    }

    pub fn intercept(&self, k: usize) -> Result<f64> {
        Ok(self.coefficients(k)?[0])
    }

    /// Linear predictor `β0 + Xβ` at λ index `k`, for X in caller units.
    pub fn predict(&self, x: &Array2<f64>, k: usize) -> Result<Array1<f64>> {
        let coef = self.coefficients(k)?;
        if x.ncols() + 1 != coef.len() {
            return Err(PathError::DimensionMismatch(format!(
                "path has {} predictors but X has {} columns",
                coef.len() - 1,
                x.ncols()
            )));
        }
        let slopes = coef.slice(ndarray::s![1..]);
        Ok(x.dot(&slopes) + coef[0])
    }

    /// True when the solver stopped at the cap for λ index `k`.
    ///
    /// That solution may not have reached the requested tolerance.
    pub fn reached_iteration_cap(&self, k: usize) -> bool {
        self.iterations
            .get(k)
            .map_or(false, |&used| used >= self.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_path() -> PathResult {
        let mut builder = PathBuilder::new(4, 2, 3);
        builder.write_column(0, 1.5, &CsVec::new(3, vec![1], vec![2.0]), false);
        builder.write_column(1, -0.5, &CsVec::new(3, vec![0, 2], vec![1.0, 3.0]), false);
        PathResult {
            lambda: array![1.0, 0.1],
            beta: builder.finish(),
            iterations: vec![3, 10],
            max_iterations: 10,
        }
    }

    #[test]
    fn test_shape_and_layout() {
        let path = small_path();
        assert_eq!(path.beta.rows(), 4);
        assert_eq!(path.beta.cols(), 2);
        assert!(path.beta.is_csc());
        assert_eq!(path.coefficients(0).unwrap(), array![1.5, 0.0, 2.0, 0.0]);
        assert_eq!(path.coefficients(1).unwrap(), array![-0.5, 1.0, 0.0, 3.0]);
        assert_eq!(path.intercept(1).unwrap(), -0.5);
    }

    #[test]
    fn test_intercept_in_coef_writes_from_row_zero() {
        let mut builder = PathBuilder::new(3, 1, 1);
        builder.write_column(0, 99.0, &CsVec::new(3, vec![0, 2], vec![0.25, -1.0]), true);
        let beta = builder.finish();
        assert_eq!(beta.get(0, 0), Some(&0.25));
        assert_eq!(beta.get(1, 0), None);
        assert_eq!(beta.get(2, 0), Some(&-1.0));
    }

    #[test]
    fn test_more_nonzeros_than_hint_are_kept() {
        let mut builder = PathBuilder::new(6, 1, 1);
        builder.write_column(0, 1.0, &CsVec::new(5, vec![0, 1, 2, 3, 4], vec![1.0; 5]), false);
        assert_eq!(builder.finish().nnz(), 6);
    }

    #[test]
    fn test_predict() {
        let path = small_path();
        let x = array![[1.0, 1.0, 1.0], [0.0, 2.0, -1.0]];
        assert_eq!(path.predict(&x, 0).unwrap(), array![3.5, 5.5]);
        assert_eq!(path.predict(&x, 1).unwrap(), array![3.5, -3.5]);
        assert!(path.predict(&array![[1.0, 2.0]], 0).is_err());
    }

    #[test]
    fn test_iteration_cap_and_range() {
        let path = small_path();
        assert!(!path.reached_iteration_cap(0));
        assert!(path.reached_iteration_cap(1));
        assert!(!path.reached_iteration_cap(5));
        assert!(path.coefficients(2).is_err());
    }
}
