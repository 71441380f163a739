// =============================================================================
// Path Solvers
// =============================================================================
//
// The driver never iterates itself. It talks to a solver through the
// `PathSolver` trait, which works on the solver-native objective
//
//     1/2 ‖y − Xβ‖² + λ' Σ pf_j |β_j|
//
// A solver holds its current iterate between calls, which is what makes warm
// starts possible: `init` starts from zero, `init_warm` keeps the iterate
// and only moves λ'.
//
// CHOOSING A SOLVER
// -----------------
// The problem shape is decided first (`ProblemShape::classify`). Only tall
// problems (n > 2p) have a solver in this revision; the driver rejects wide
// ones before any factory runs. A factory then maps the family to a solver,
// or reports an unsupported configuration. `default_solver` knows only the
// Gaussian family.
//
// =============================================================================

mod oem;

pub use oem::OemSolver;

use std::fmt;

use ndarray::{Array1, Array2};
use sprs::CsVec;

use crate::error::{PathError, Result};
use crate::families::Family;

/// An iterative solver that can be driven along a λ path.
pub trait PathSolver {
    /// Smallest solver-native λ' at which every penalized coefficient is zero.
    fn lambda_zero(&self) -> f64;

    /// Reset the iterate to zero and set λ'.
    fn init(&mut self, lambda: f64);

    /// Set a new λ', keeping the current iterate as the starting point.
    fn init_warm(&mut self, lambda: f64);

    /// Iterate until converged or `max_iterations` is reached.
    ///
    /// Returns the number of iterations used. A return equal to
    /// `max_iterations` means the tolerance was not reached.
    fn solve(&mut self, max_iterations: usize) -> usize;

    /// Current coefficients on the solver's (standardized) scale.
    fn coefficients(&self) -> CsVec<f64>;
}

impl<S: PathSolver + ?Sized> PathSolver for Box<S> {
    fn lambda_zero(&self) -> f64 {
        (**self).lambda_zero()
    }

    fn init(&mut self, lambda: f64) {
        (**self).init(lambda)
    }

    fn init_warm(&mut self, lambda: f64) {
        (**self).init_warm(lambda)
    }

    fn solve(&mut self, max_iterations: usize) -> usize {
        (**self).solve(max_iterations)
    }

    fn coefficients(&self) -> CsVec<f64> {
        (**self).coefficients()
    }
}

/// Which solver variant a problem calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemShape {
    /// More than twice as many rows as columns: dense Gram-matrix solvers.
    Tall,
    /// Everything else. No solver in this revision.
    Wide,
}

impl ProblemShape {
    /// Classify an `n × p` design (p before any intercept column is added).
    pub fn classify(n: usize, p: usize) -> Self {
        if n > 2 * p {
            ProblemShape::Tall
        } else {
            ProblemShape::Wide
        }
    }
}

impl fmt::Display for ProblemShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemShape::Tall => f.write_str("tall"),
            ProblemShape::Wide => f.write_str("wide"),
        }
    }
}

/// Everything a solver factory may need to build a solver.
///
/// `x` is the design after standardization (and after the intercept column
/// was prepended, for non-Gaussian families).
#[derive(Debug, Clone, Copy)]
pub struct SolverProblem<'a> {
    pub x: &'a Array2<f64>,
    pub y: &'a Array1<f64>,
    pub penalty_factor: &'a Array1<f64>,
    pub family: Family,
    pub shape: ProblemShape,
    /// Primary convergence tolerance.
    pub tolerance: f64,
    /// Inner-loop limits for non-linear families.
    pub irls_max_iterations: usize,
    pub irls_tolerance: f64,
}

/// The built-in solver factory.
///
/// Gaussian tall problems get an [`OemSolver`]; anything else is an
/// unsupported configuration.
pub fn default_solver(problem: &SolverProblem<'_>) -> Result<OemSolver> {
    match (problem.family, problem.shape) {
        (Family::Gaussian, ProblemShape::Tall) => {
            OemSolver::new(problem.x, problem.y, problem.penalty_factor, problem.tolerance)
        }
        (family, shape) => Err(PathError::UnsupportedConfiguration(format!(
            "no built-in solver for the {} family on a {} problem",
            family, shape
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_shape_boundary() {
        assert_eq!(ProblemShape::classify(7, 3), ProblemShape::Tall);
        assert_eq!(ProblemShape::classify(6, 3), ProblemShape::Wide);
        assert_eq!(ProblemShape::classify(3, 10), ProblemShape::Wide);
    }

    #[test]
    fn test_default_solver_rejects_binomial() {
        let x = Array2::from_shape_fn((8, 2), |(i, j)| (i + j) as f64);
        let y = array![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0];
        let pf = Array1::ones(2);
        let problem = SolverProblem {
            x: &x,
            y: &y,
            penalty_factor: &pf,
            family: Family::Binomial,
            shape: ProblemShape::Tall,
            tolerance: 1e-7,
            irls_max_iterations: 100,
            irls_tolerance: 1e-3,
        };
        let err = default_solver(&problem).unwrap_err();
        assert!(matches!(err, PathError::UnsupportedConfiguration(_)));
        assert!(err.to_string().contains("binomial"));
    }

    #[test]
    fn test_default_solver_builds_gaussian() {
        let x = Array2::from_shape_fn((8, 2), |(i, j)| ((i + 1) * (j + 1)) as f64);
        let y = Array1::from_shape_fn(8, |i| i as f64);
        let pf = Array1::ones(2);
        let problem = SolverProblem {
            x: &x,
            y: &y,
            penalty_factor: &pf,
            family: Family::Gaussian,
            shape: ProblemShape::Tall,
            tolerance: 1e-7,
            irls_max_iterations: 100,
            irls_tolerance: 1e-3,
        };
        let solver = default_solver(&problem).unwrap();
        assert!(solver.lambda_zero() > 0.0);
    }
}
