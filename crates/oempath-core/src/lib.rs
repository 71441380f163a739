// =============================================================================
// oempath Core Library
// =============================================================================
//
// Entry point for fitting penalized linear-regression paths.
//
// A path is a sequence of lasso fits across decreasing penalty strengths.
// The heavy iteration is delegated to a solver behind the `PathSolver`
// trait; this crate owns everything around it:
//
//   raw (X, Y, weights)
//     → StandardizationTransform::forward   (standardize)
//     → solver driven across λ with warm starts (path, solvers)
//     → StandardizationTransform::recover per solution
//     → sparse (p+1) × nλ coefficient path   (path::output)
//
// STRUCTURE:
// ----------
//   - error:       Error types used throughout the library
//   - families:    Regression family identifiers
//   - standardize: Column statistics, forward transform, coefficient recovery
//   - solvers:     The solver contract, shape dispatch, built-in OEM solver
//   - path:        The path driver, λ sequences, output assembly
//   - convert:     ndarray ↔ nalgebra helpers
//
// FOR MAINTAINERS:
// ----------------
// When adding a new family:
//   1. Add the variant in `families`
//   2. Teach a solver factory to build a solver for it (see `solvers`)
//   3. Write tests next to the code and in `tests/`
//
// =============================================================================

pub mod convert;
pub mod error;
pub mod families;
pub mod path;
pub mod solvers;
pub mod standardize;

// Re-export commonly used items at the top level for convenience
pub use error::{PathError, Result};
pub use families::Family;
pub use path::{fit_path, fit_path_with, LambdaSequence, PathConfig, PathResult};
pub use solvers::{default_solver, OemSolver, PathSolver, ProblemShape, SolverProblem};
pub use standardize::{StandardizationTransform, StandardizeMode, StatsBackend};
