// =============================================================================
// Standardization
// =============================================================================
//
// Location/scale statistics for the design matrix and response, the forward
// transform applied before fitting, and the recovery of coefficients back to
// the caller's units afterwards.
//
// THE MODE
// --------
// Two flags, encoded as `standardize + 2 * intercept`:
//
//   0  nothing computed, nothing applied
//   1  scaleX computed and applied
//   2  meanX, meanY computed, NOT applied
//   3  meanX, meanY, scaleX computed, only scaleX applied
//
// scaleY is always 1. The means in modes 2 and 3 are never subtracted from
// the data, yet recovery still reconstructs an intercept from them as if the
// data had been centered. That is the contract of this transform; changing
// it changes the fitted model.
//
// SCALE DEFINITION
// ----------------
// scale = ‖x‖ / √n, an uncentered root-mean-square. Columns whose scale is
// exactly zero get scale 1 instead.
//
// =============================================================================

mod column_stats;
mod transform;

pub use column_stats::{column_moments, ColumnMoments, StatsBackend};
pub use transform::{StandardizationTransform, StandardizeMode};
