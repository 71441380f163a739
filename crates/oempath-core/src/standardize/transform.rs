// =============================================================================
// Standardization Transform
// =============================================================================
//
// Forward on the data, recovery on the coefficients.
//
// Mode 3 scales with unweighted column statistics; only the response mean
// is weighted there. Modes 1 and 2 weight every statistic they compute.
//
// =============================================================================

use ndarray::{Array1, Array2, ArrayView1};
use sprs::CsVec;

use super::column_stats::StatsBackend;
use crate::error::{PathError, Result};

/// Which statistics are computed and which are applied.
///
/// Encoded as `standardize + 2 * intercept`, see [`StandardizeMode::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardizeMode {
    /// Mode 0: fit the data as given.
    Identity,
    /// Mode 1: scale columns, no intercept.
    Scale,
    /// Mode 2: record means for the intercept, leave the data alone.
    Center,
    /// Mode 3: scale columns and record means for the intercept.
    ScaleAndCenter,
}

impl StandardizeMode {
    pub fn from_flags(standardize: bool, intercept: bool) -> Self {
        match (standardize, intercept) {
            (false, false) => StandardizeMode::Identity,
            (true, false) => StandardizeMode::Scale,
            (false, true) => StandardizeMode::Center,
            (true, true) => StandardizeMode::ScaleAndCenter,
        }
    }

    /// The 0–3 integer form of the mode.
    pub fn code(&self) -> u8 {
        match self {
            StandardizeMode::Identity => 0,
            StandardizeMode::Scale => 1,
            StandardizeMode::Center => 2,
            StandardizeMode::ScaleAndCenter => 3,
        }
    }
}

// Storage exists only for the statistics the mode needs, so recovery cannot
// read a field the forward pass never filled.
#[derive(Debug, Clone)]
enum Statistics {
    Identity,
    Scale {
        scale_x: Array1<f64>,
    },
    Center {
        mean_x: Array1<f64>,
        mean_y: f64,
    },
    ScaleAndCenter {
        mean_x: Array1<f64>,
        scale_x: Array1<f64>,
        mean_y: f64,
    },
}

/// Standardizes a design matrix before fitting and maps the fitted
/// coefficients back to the original units afterwards.
///
/// ```ignore
/// let mut tf = StandardizationTransform::new(n, p, true, true);
/// tf.forward(&mut x, y.view(), None)?;
/// // ... fit on x ...
/// let beta0 = tf.recover_sparse(&mut coef)?;
/// ```
#[derive(Debug, Clone)]
pub struct StandardizationTransform {
    n: usize,
    p: usize,
    mode: StandardizeMode,
    stats: Statistics,
    scale_y: f64,
    backend: StatsBackend,
}

impl StandardizationTransform {
    /// Allocate a transform for an `n × p` problem.
    pub fn new(n: usize, p: usize, standardize: bool, intercept: bool) -> Self {
        let mode = StandardizeMode::from_flags(standardize, intercept);
        let stats = match mode {
            StandardizeMode::Identity => Statistics::Identity,
            StandardizeMode::Scale => Statistics::Scale {
                scale_x: Array1::ones(p),
            },
            StandardizeMode::Center => Statistics::Center {
                mean_x: Array1::zeros(p),
                mean_y: 0.0,
            },
            StandardizeMode::ScaleAndCenter => Statistics::ScaleAndCenter {
                mean_x: Array1::zeros(p),
                scale_x: Array1::ones(p),
                mean_y: 0.0,
            },
        };

        Self {
            n,
            p,
            mode,
            stats,
            scale_y: 1.0,
            backend: StatsBackend::default(),
        }
    }

    /// Choose how the column statistics are scheduled.
    pub fn with_backend(mut self, backend: StatsBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn mode(&self) -> StandardizeMode {
        self.mode
    }

    /// Response scale. Always 1 for this transform.
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Column means, present in modes 2 and 3.
    pub fn mean_x(&self) -> Option<ArrayView1<'_, f64>> {
        match &self.stats {
            Statistics::Center { mean_x, .. } | Statistics::ScaleAndCenter { mean_x, .. } => {
                Some(mean_x.view())
            }
            _ => None,
        }
    }

    /// Column scales, present in modes 1 and 3.
    pub fn scale_x(&self) -> Option<ArrayView1<'_, f64>> {
        match &self.stats {
            Statistics::Scale { scale_x } | Statistics::ScaleAndCenter { scale_x, .. } => {
                Some(scale_x.view())
            }
            _ => None,
        }
    }

    /// Response mean, present in modes 2 and 3.
    pub fn mean_y(&self) -> Option<f64> {
        match &self.stats {
            Statistics::Center { mean_y, .. } | Statistics::ScaleAndCenter { mean_y, .. } => {
                Some(*mean_y)
            }
            _ => None,
        }
    }

    /// Compute the statistics and apply the mode's transform to `x`.
    ///
    /// Only column scaling is ever applied. Means are recorded but never
    /// subtracted, and the response is never modified, so `y` is borrowed
    /// immutably.
    pub fn forward(
        &mut self,
        x: &mut Array2<f64>,
        y: ArrayView1<'_, f64>,
        weights: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        if x.dim() != (self.n, self.p) {
            return Err(PathError::DimensionMismatch(format!(
                "transform built for {}x{} but X is {}x{}",
                self.n,
                self.p,
                x.nrows(),
                x.ncols()
            )));
        }
        if y.len() != self.n {
            return Err(PathError::DimensionMismatch(format!(
                "transform built for {} rows but y has {} elements",
                self.n,
                y.len()
            )));
        }
        if let Some(w) = weights {
            if w.len() != self.n {
                return Err(PathError::DimensionMismatch(format!(
                    "transform built for {} rows but weights has {} elements",
                    self.n,
                    w.len()
                )));
            }
        }

        if self.mode == StandardizeMode::Identity {
            return Ok(());
        }

        let sqrt_weights = weights.map(|w| w.mapv(f64::sqrt));
        // Mode 3 takes its column statistics unweighted; only meanY sees the
        // weights there.
        let column_weights = match self.mode {
            StandardizeMode::ScaleAndCenter => None,
            _ => sqrt_weights.as_ref().map(|w| w.view()),
        };
        let moments = self.backend.compute(x.view(), column_weights);
        let response_mean = || match &sqrt_weights {
            Some(sw) => mean_in_order((&y * sw).view()),
            None => mean_in_order(y),
        };

        match &mut self.stats {
            Statistics::Identity => {}
            Statistics::Scale { scale_x } => {
                for (j, m) in moments.iter().enumerate() {
                    scale_x[j] = m.scale;
                }
            }
            Statistics::Center { mean_x, mean_y } => {
                for (j, m) in moments.iter().enumerate() {
                    mean_x[j] = m.mean;
                }
                *mean_y = response_mean();
            }
            Statistics::ScaleAndCenter {
                mean_x,
                scale_x,
                mean_y,
            } => {
                for (j, m) in moments.iter().enumerate() {
                    mean_x[j] = m.mean;
                    scale_x[j] = m.scale;
                }
                *mean_y = response_mean();
            }
        }

        if let Some(scale_x) = self.scale_x() {
            for (mut col, &s) in x.columns_mut().into_iter().zip(scale_x.iter()) {
                col.mapv_inplace(|v| v / s);
            }
        }

        log::debug!(
            "standardized {}x{} design in mode {}",
            self.n,
            self.p,
            self.mode.code()
        );
        Ok(())
    }

    /// Map a dense solver-space coefficient vector back to caller units.
    ///
    /// Rescales `coef` in place and returns the intercept.
    pub fn recover_dense(&self, coef: &mut Array1<f64>) -> Result<f64> {
        self.check_len(coef.len())?;

        match &self.stats {
            Statistics::Identity => Ok(0.0),
            Statistics::Scale { scale_x } => {
                coef.zip_mut_with(scale_x, |c, &s| *c /= s);
                coef.mapv_inplace(|c| c * self.scale_y);
                Ok(0.0)
            }
            Statistics::Center { mean_x, mean_y } => {
                coef.mapv_inplace(|c| c * self.scale_y);
                Ok(mean_y - dense_inner_product(coef, mean_x))
            }
            Statistics::ScaleAndCenter {
                mean_x,
                scale_x,
                mean_y,
            } => {
                coef.zip_mut_with(scale_x, |c, &s| *c /= s);
                coef.mapv_inplace(|c| c * self.scale_y);
                Ok(mean_y - dense_inner_product(coef, mean_x))
            }
        }
    }

    /// Map a sparse solver-space coefficient vector back to caller units.
    ///
    /// Touches stored entries only, so the sparsity pattern is unchanged.
    /// Gives the same numbers as [`recover_dense`](Self::recover_dense) on
    /// the equivalent dense vector.
    pub fn recover_sparse(&self, coef: &mut CsVec<f64>) -> Result<f64> {
        self.check_len(coef.dim())?;

        match &self.stats {
            Statistics::Identity => Ok(0.0),
            Statistics::Scale { scale_x } => {
                elementwise_quot(coef, scale_x);
                scale_stored(coef, self.scale_y);
                Ok(0.0)
            }
            Statistics::Center { mean_x, mean_y } => {
                scale_stored(coef, self.scale_y);
                Ok(mean_y - sparse_inner_product(coef, mean_x))
            }
            Statistics::ScaleAndCenter {
                mean_x,
                scale_x,
                mean_y,
            } => {
                elementwise_quot(coef, scale_x);
                scale_stored(coef, self.scale_y);
                Ok(mean_y - sparse_inner_product(coef, mean_x))
            }
        }
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.p {
            return Err(PathError::DimensionMismatch(format!(
                "transform built for {} coefficients but got {}",
                self.p, len
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================
//
// Both inner products accumulate left to right in index order. Skipped zero
// entries would only add ±0.0, so the dense and sparse forms agree exactly.

fn mean_in_order(v: ArrayView1<'_, f64>) -> f64 {
    v.iter().fold(0.0, |acc, &x| acc + x) / v.len() as f64
}

fn dense_inner_product(coef: &Array1<f64>, arr: &Array1<f64>) -> f64 {
    coef.iter()
        .zip(arr.iter())
        .fold(0.0, |acc, (&c, &a)| acc + c * a)
}

fn sparse_inner_product(coef: &CsVec<f64>, arr: &Array1<f64>) -> f64 {
    coef.iter().fold(0.0, |acc, (i, &c)| acc + c * arr[i])
}

fn elementwise_quot(coef: &mut CsVec<f64>, arr: &Array1<f64>) {
    for (i, c) in coef.iter_mut() {
        *c /= arr[i];
    }
}

fn scale_stored(coef: &mut CsVec<f64>, factor: f64) {
    for (_, c) in coef.iter_mut() {
        *c *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn design() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 0.0, 2.0],
            [2.0, 0.0, -1.0],
            [3.0, 0.0, 0.5],
            [4.0, 0.0, 4.0],
        ];
        let y = array![1.5, -0.5, 2.0, 3.0];
        (x, y)
    }

    #[test]
    fn test_mode_encoding() {
        for code in 0..4u8 {
            let standardize = code & 1 == 1;
            let intercept = code & 2 == 2;
            assert_eq!(StandardizeMode::from_flags(standardize, intercept).code(), code);
        }
    }

    #[test]
    fn test_storage_follows_mode() {
        let t = StandardizationTransform::new(4, 3, false, false);
        assert!(t.mean_x().is_none() && t.scale_x().is_none() && t.mean_y().is_none());

        let t = StandardizationTransform::new(4, 3, true, false);
        assert!(t.mean_x().is_none() && t.scale_x().is_some());

        let t = StandardizationTransform::new(4, 3, false, true);
        assert!(t.mean_x().is_some() && t.scale_x().is_none() && t.mean_y().is_some());

        let t = StandardizationTransform::new(4, 3, true, true);
        assert!(t.mean_x().is_some() && t.scale_x().is_some());
    }

    #[test]
    fn test_mode_0_is_noop() {
        let (mut x, y) = design();
        let (x0, y0) = (x.clone(), y.clone());
        let mut t = StandardizationTransform::new(4, 3, false, false);
        t.forward(&mut x, y.view(), None).unwrap();
        assert_eq!(x, x0);
        assert_eq!(y, y0);

        let mut coef = array![1.0, -2.0, 3.0];
        let beta0 = t.recover_dense(&mut coef).unwrap();
        assert_eq!(beta0, 0.0);
        assert_eq!(coef, array![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_mode_1_scales_columns() {
        let (mut x, y) = design();
        let x0 = x.clone();
        let mut t = StandardizationTransform::new(4, 3, true, false);
        t.forward(&mut x, y.view(), None).unwrap();

        let scale = t.scale_x().unwrap().to_owned();
        let expected0 = (1.0f64 + 4.0 + 9.0 + 16.0).sqrt() / 2.0;
        assert_relative_eq!(scale[0], expected0, max_relative = 1e-15);
        assert_eq!(scale[1], 1.0); // all-zero column
        assert_eq!(t.scale_y(), 1.0);

        for j in 0..3 {
            for i in 0..4 {
                assert_eq!(x[[i, j]], x0[[i, j]] / scale[j]);
            }
        }

        let mut coef = array![0.5, 0.25, -1.0];
        let beta0 = t.recover_dense(&mut coef).unwrap();
        assert_eq!(beta0, 0.0);
        assert_eq!(coef[0], 0.5 / scale[0]);
        assert_eq!(coef[1], 0.25);
        assert_eq!(coef[2], -1.0 / scale[2]);
    }

    #[test]
    fn test_modes_2_and_3_leave_data_untouched() {
        for standardize in [false, true] {
            let (mut x, y) = design();
            let mut t = StandardizationTransform::new(4, 3, standardize, true);
            let x0 = x.clone();
            t.forward(&mut x, y.view(), None).unwrap();

            if !standardize {
                assert_eq!(x, x0);
            }
            assert_eq!(t.mean_y(), Some(1.5));
            assert_eq!(t.mean_x().unwrap()[0], 2.5);

            let mut zero = Array1::zeros(3);
            let beta0 = t.recover_dense(&mut zero).unwrap();
            assert_eq!(beta0, 1.5);
        }
    }

    #[test]
    fn test_mode_3_scales_but_does_not_center() {
        let (mut x, y) = design();
        let x0 = x.clone();
        let mut t = StandardizationTransform::new(4, 3, true, true);
        t.forward(&mut x, y.view(), None).unwrap();

        let scale = t.scale_x().unwrap().to_owned();
        for j in 0..3 {
            for i in 0..4 {
                assert_eq!(x[[i, j]], x0[[i, j]] / scale[j]);
            }
        }

        let mut coef = array![1.0, 0.0, 2.0];
        let beta0 = t.recover_dense(&mut coef).unwrap();
        let mean_x = t.mean_x().unwrap();
        assert_eq!(coef[0], 1.0 / scale[0]);
        assert_relative_eq!(
            beta0,
            1.5 - coef[0] * mean_x[0] - coef[2] * mean_x[2],
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_dense_and_sparse_recover_agree() {
        for code in 0..4u8 {
            let (mut x, y) = design();
            let weights = array![1.0, 2.0, 0.5, 3.0];
            let mut t = StandardizationTransform::new(4, 3, code & 1 == 1, code & 2 == 2);
            t.forward(&mut x, y.view(), Some(weights.view())).unwrap();

            let mut dense = array![0.7, 0.0, -1.3];
            let mut sparse = CsVec::new(3, vec![0, 2], vec![0.7, -1.3]);

            let b_dense = t.recover_dense(&mut dense).unwrap();
            let b_sparse = t.recover_sparse(&mut sparse).unwrap();

            assert_eq!(b_dense, b_sparse, "mode {}", code);
            assert_eq!(sparse.nnz(), 2);
            assert_eq!(sparse.indices(), &[0, 2]);
            for (i, &v) in sparse.iter() {
                assert_eq!(v, dense[i]);
            }
            assert_eq!(dense[1], 0.0);
        }
    }

    #[test]
    fn test_weighted_statistics() {
        // sqrt(4) doubles every entry
        let weights = array![4.0, 4.0, 4.0, 4.0];

        let (mut x, y) = design();
        let mut t = StandardizationTransform::new(4, 3, false, true);
        t.forward(&mut x, y.view(), Some(weights.view())).unwrap();
        assert_eq!(t.mean_y(), Some(3.0));
        assert_eq!(t.mean_x().unwrap()[0], 5.0);

        let (mut x, y) = design();
        let mut t = StandardizationTransform::new(4, 3, true, false);
        t.forward(&mut x, y.view(), Some(weights.view())).unwrap();
        assert_relative_eq!(t.scale_x().unwrap()[0], 120.0f64.sqrt() / 2.0, max_relative = 1e-15);
    }

    #[test]
    fn test_mode_3_column_statistics_ignore_weights() {
        let (mut x, y) = design();
        let weights = array![9.0, 1.0, 1.0, 1.0];
        let mut t = StandardizationTransform::new(4, 3, true, true);
        t.forward(&mut x, y.view(), Some(weights.view())).unwrap();

        let mut unweighted = StandardizationTransform::new(4, 3, true, true);
        unweighted.forward(&mut design().0, y.view(), None).unwrap();

        assert_eq!(t.mean_x().unwrap()[0], 2.5);
        assert_relative_eq!(t.scale_x().unwrap()[0], 30.0f64.sqrt() / 2.0, max_relative = 1e-15);
        assert_eq!(t.mean_x(), unweighted.mean_x());
        assert_eq!(t.scale_x(), unweighted.scale_x());
        // the response mean is still weighted: (3·1.5 − 0.5 + 2 + 3) / 4
        assert_eq!(t.mean_y(), Some(2.25));
    }

    #[test]
    fn test_forward_rejects_wrong_shapes() {
        let (mut x, y) = design();
        let mut t = StandardizationTransform::new(5, 3, true, true);
        assert!(matches!(
            t.forward(&mut x, y.view(), None),
            Err(PathError::DimensionMismatch(_))
        ));

        let t = StandardizationTransform::new(4, 3, true, true);
        let mut coef = Array1::zeros(2);
        assert!(t.recover_dense(&mut coef).is_err());
    }

    #[test]
    fn test_parallel_backend_matches_sequential() {
        let (mut xa, y) = design();
        let mut xb = xa.clone();
        let mut ta = StandardizationTransform::new(4, 3, true, true);
        let mut tb =
            StandardizationTransform::new(4, 3, true, true).with_backend(StatsBackend::Parallel);
        ta.forward(&mut xa, y.view(), None).unwrap();
        tb.forward(&mut xb, y.view(), None).unwrap();
        assert_eq!(xa, xb);
        assert_eq!(ta.scale_x(), tb.scale_x());
        assert_eq!(ta.mean_x(), tb.mean_x());
    }
}
