// =============================================================================
// Column Statistics
// =============================================================================
//
// Every back-end reduces a column to the same pure `ColumnMoments` pair
// through `column_moments`. Back-ends differ only in how the columns are
// scheduled.
//
// =============================================================================

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Location and scale of one design-matrix column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMoments {
    /// Mean of the (weighted) column.
    pub mean: f64,
    /// Uncentered root-mean-square `‖x‖ / √n`, or 1.0 when that is zero.
    pub scale: f64,
}

/// Compute the moments of a single column.
///
/// With weights, every entry is multiplied by `sqrt(w_i)` before either
/// statistic is taken. `sqrt_weights` must already hold the square roots.
pub fn column_moments(
    column: ArrayView1<'_, f64>,
    sqrt_weights: Option<ArrayView1<'_, f64>>,
) -> ColumnMoments {
    let n = column.len() as f64;

    let (sum, sum_sq) = match sqrt_weights {
        Some(sw) => column
            .iter()
            .zip(sw.iter())
            .fold((0.0, 0.0), |(s, ss), (&x, &w)| {
                let v = x * w;
                (s + v, ss + v * v)
            }),
        None => column
            .iter()
            .fold((0.0, 0.0), |(s, ss), &x| (s + x, ss + x * x)),
    };

    let scale = sum_sq.sqrt() / n.sqrt();

    ColumnMoments {
        mean: sum / n,
        // Zero-variance column: leave it unscaled rather than divide by zero
        scale: if scale == 0.0 { 1.0 } else { scale },
    }
}

/// How the per-column statistics are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsBackend {
    /// One column after another on the calling thread.
    #[default]
    Sequential,
    /// Columns distributed over the rayon thread pool.
    Parallel,
}

impl StatsBackend {
    /// Moments for every column of `x`, in column order.
    pub fn compute(
        &self,
        x: ArrayView2<'_, f64>,
        sqrt_weights: Option<ArrayView1<'_, f64>>,
    ) -> Vec<ColumnMoments> {
        match self {
            StatsBackend::Sequential => x
                .columns()
                .into_iter()
                .map(|col| column_moments(col, sqrt_weights))
                .collect(),
            StatsBackend::Parallel => (0..x.ncols())
                .into_par_iter()
                .map(|j| column_moments(x.column(j), sqrt_weights))
                .collect(),
        }
    }
}
