// =============================================================================
// Path Driver
// =============================================================================
//
// Fits a sequence of lasso models over decreasing λ, reusing each solution
// as the starting point for the next.
//
// OBJECTIVE CONVENTIONS
// ---------------------
// Callers think in the glmnet convention
//
//     1/(2n) ‖y − Xβ‖² + λ ‖β‖₁
//
// while solvers minimize  1/2 ‖y − Xβ‖² + λ' ‖β‖₁.  The two agree when
//
//     λ' = λ · n / scaleY          λ_max = lambda_zero / n · scaleY
//
// THE STEPS
// ---------
//   0. Validate inputs and options (nothing is built if this fails)
//   1. Classify the shape; wide problems stop here
//   2. Family dispatch: non-Gaussian families skip standardization and get
//      an explicit, unpenalized intercept column instead
//   3. Standardize X
//   4. Build the solver through the factory
//   5. Resolve the λ sequence (explicit, or generated from λ_max)
//   6. Walk the path: cold start at λ[0], warm starts afterwards, recover
//      each solution to caller units and write it into the path matrix
//
// The λ steps form a dependency chain through the warm starts and run one
// after another on the calling thread. The solver is owned by this call and
// dropped on every exit path.
//
// =============================================================================

mod lambda;
mod output;

pub use lambda::{generate_lambda_sequence, validate_auto_options, validate_lambda_sequence};
pub use output::PathResult;

use ndarray::{s, Array1, Array2};

use crate::error::{PathError, Result};
use crate::families::Family;
use crate::solvers::{default_solver, PathSolver, ProblemShape, SolverProblem};
use crate::standardize::{StandardizationTransform, StatsBackend};
use output::PathBuilder;

// =============================================================================
// Configuration
// =============================================================================

/// Where the λ values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaSequence {
    /// Use these values as given. Must be positive and non-increasing.
    Explicit(Vec<f64>),
    /// Generate `count` log-spaced values from λ_max down to
    /// `min_ratio · λ_max`.
    Auto { count: usize, min_ratio: f64 },
}

impl Default for LambdaSequence {
    fn default() -> Self {
        LambdaSequence::Auto {
            count: 100,
            min_ratio: 1e-4,
        }
    }
}

/// Options for fitting a path.
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Iteration cap for each λ.
    /// Default: 500
    pub max_iterations: usize,

    /// Convergence tolerance handed to the solver.
    /// Default: 1e-7
    pub tolerance: f64,

    /// Inner-loop cap for non-linear families. Unused by the Gaussian solver.
    /// Default: 100
    pub irls_max_iterations: usize,

    /// Inner-loop tolerance for non-linear families. Unused by the Gaussian
    /// solver.
    /// Default: 1e-3
    pub irls_tolerance: f64,

    /// Scale the predictors before fitting (Gaussian only).
    /// Default: true
    pub standardize: bool,

    /// Fit an intercept.
    /// Default: true
    pub intercept: bool,

    /// The λ values to fit.
    /// Default: 100 automatic values down to 1e-4 · λ_max
    pub lambda: LambdaSequence,

    /// How column statistics are scheduled.
    /// Default: sequential
    pub stats_backend: StatsBackend,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-7,
            irls_max_iterations: 100,
            irls_tolerance: 1e-3,
            standardize: true,
            intercept: true,
            lambda: LambdaSequence::default(),
            stats_backend: StatsBackend::default(),
        }
    }
}

impl PathConfig {
    /// Check option values without touching any data.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(PathError::InvalidValue(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(PathError::InvalidValue(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        match &self.lambda {
            LambdaSequence::Explicit(values) => validate_lambda_sequence(values),
            LambdaSequence::Auto { count, min_ratio } => validate_auto_options(*count, *min_ratio),
        }
    }
}

// =============================================================================
// Fitting
// =============================================================================

/// Fit a regularization path with the built-in solver.
///
/// # Arguments
/// * `x` - Design matrix (n × p), without an intercept column
/// * `y` - Response (n)
/// * `family` - Response family; only Gaussian has a built-in solver
/// * `penalty_factor` - Per-coefficient L1 multipliers (p); all ones if `None`
/// * `weights` - Observation weights (n) for the standardization statistics
/// * `config` - Path options
///
/// # Example
/// ```ignore
/// let config = PathConfig {
///     lambda: LambdaSequence::Auto { count: 50, min_ratio: 1e-3 },
///     ..Default::default()
/// };
/// let path = fit_path(&x, &y, Family::Gaussian, None, None, &config)?;
/// let beta_at_smallest_lambda = path.coefficients(path.n_lambda() - 1)?;
/// ```
pub fn fit_path(
    x: &Array2<f64>,
    y: &Array1<f64>,
    family: Family,
    penalty_factor: Option<&Array1<f64>>,
    weights: Option<&Array1<f64>>,
    config: &PathConfig,
) -> Result<PathResult> {
    fit_path_with(x, y, family, penalty_factor, weights, config, default_solver)
}

/// Fit a regularization path with a caller-supplied solver factory.
///
/// The factory runs at most once, after validation, shape dispatch and
/// standardization have succeeded. Returning an error from it aborts the
/// fit before any λ is visited.
pub fn fit_path_with<S, F>(
    x: &Array2<f64>,
    y: &Array1<f64>,
    family: Family,
    penalty_factor: Option<&Array1<f64>>,
    weights: Option<&Array1<f64>>,
    config: &PathConfig,
    factory: F,
) -> Result<PathResult>
where
    S: PathSolver,
    F: FnOnce(&SolverProblem<'_>) -> Result<S>,
{
    // -------------------------------------------------------------------------
    // Step 0: Validate inputs
    // -------------------------------------------------------------------------
    let (n, p) = x.dim();
    validate_inputs(x, y, penalty_factor, weights)?;
    config.validate()?;
    let penalty_factor = penalty_factor.cloned().unwrap_or_else(|| Array1::ones(p));

    // -------------------------------------------------------------------------
    // Step 1: Shape dispatch
    // -------------------------------------------------------------------------
    let shape = ProblemShape::classify(n, p);
    if shape == ProblemShape::Wide {
        return Err(PathError::UnsupportedConfiguration(format!(
            "{} family with n = {} and p = {}: only problems with n > 2p have a solver",
            family, n, p
        )));
    }

    // -------------------------------------------------------------------------
    // Step 2: Family dispatch
    // -------------------------------------------------------------------------
    // Outside the Gaussian family the intercept is fit directly as an
    // unpenalized column of ones, and the solver output is already final.
    let (standardize, intercept, augmented) = if family.supports_standardization() {
        (config.standardize, config.intercept, false)
    } else {
        (false, false, config.intercept)
    };
    let (mut x_work, penalty_factor) = if augmented {
        augment_intercept(x, &penalty_factor)
    } else {
        (x.to_owned(), penalty_factor)
    };

    // -------------------------------------------------------------------------
    // Step 3: Standardize
    // -------------------------------------------------------------------------
    let mut transform = StandardizationTransform::new(n, x_work.ncols(), standardize, intercept)
        .with_backend(config.stats_backend);
    transform.forward(&mut x_work, y.view(), weights.map(|w| w.view()))?;
    let scale_y = transform.scale_y();

    log::debug!(
        "fitting {} path: n = {}, p = {}, {} shape, mode {}, intercept column: {}",
        family,
        n,
        p,
        shape,
        transform.mode().code(),
        augmented
    );

    // -------------------------------------------------------------------------
    // Step 4: Build the solver
    // -------------------------------------------------------------------------
    let problem = SolverProblem {
        x: &x_work,
        y,
        penalty_factor: &penalty_factor,
        family,
        shape,
        tolerance: config.tolerance,
        irls_max_iterations: config.irls_max_iterations,
        irls_tolerance: config.irls_tolerance,
    };
    let mut solver = factory(&problem)?;

    // -------------------------------------------------------------------------
    // Step 5: Resolve λ
    // -------------------------------------------------------------------------
    let lambda = match &config.lambda {
        LambdaSequence::Explicit(values) => Array1::from_vec(values.clone()),
        LambdaSequence::Auto { count, min_ratio } => {
            let lambda_max = solver.lambda_zero() / n as f64 * scale_y;
            log::debug!("lambda_max = {:.6e}", lambda_max);
            generate_lambda_sequence(lambda_max, *count, *min_ratio)?
        }
    };

    // -------------------------------------------------------------------------
    // Step 6: Walk the path
    // -------------------------------------------------------------------------
    let mut builder = PathBuilder::new(p + 1, lambda.len(), n.min(p));
    let mut iterations = Vec::with_capacity(lambda.len());

    for (k, &lam) in lambda.iter().enumerate() {
        let native_lambda = lam * n as f64 / scale_y;
        if k == 0 {
            solver.init(native_lambda);
        } else {
            solver.init_warm(native_lambda);
        }

        let used = solver.solve(config.max_iterations);
        if used >= config.max_iterations {
            log::warn!(
                "lambda[{}] = {:.6e} stopped at the iteration cap ({})",
                k,
                lam,
                config.max_iterations
            );
        }

        let mut coef = solver.coefficients();
        if coef.dim() != x_work.ncols() {
            return Err(PathError::DimensionMismatch(format!(
                "solver returned {} coefficients at lambda[{}] but the fitted design has {} columns",
                coef.dim(),
                k,
                x_work.ncols()
            )));
        }
        let beta0 = if augmented {
            0.0
        } else {
            transform.recover_sparse(&mut coef)?
        };
        builder.write_column(k, beta0, &coef, augmented);
        iterations.push(used);

        log::debug!(
            "lambda[{}] = {:.6e}: {} iterations, {} nonzero",
            k,
            lam,
            used,
            coef.nnz()
        );
    }

    Ok(PathResult {
        lambda,
        beta: builder.finish(),
        iterations,
        max_iterations: config.max_iterations,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn validate_inputs(
    x: &Array2<f64>,
    y: &Array1<f64>,
    penalty_factor: Option<&Array1<f64>>,
    weights: Option<&Array1<f64>>,
) -> Result<()> {
    let (n, p) = x.dim();

    if n == 0 {
        return Err(PathError::EmptyInput("X has no rows".to_string()));
    }
    if p == 0 {
        return Err(PathError::EmptyInput("X has no columns".to_string()));
    }
    if y.len() != n {
        return Err(PathError::DimensionMismatch(format!(
            "X has {} rows but y has {} elements",
            n,
            y.len()
        )));
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return Err(PathError::InvalidValue(
            "X and y must not contain NaN or infinite values".to_string(),
        ));
    }

    if let Some(pf) = penalty_factor {
        if pf.len() != p {
            return Err(PathError::DimensionMismatch(format!(
                "X has {} columns but penalty_factor has {} elements",
                p,
                pf.len()
            )));
        }
        if pf.iter().any(|&v| !(v.is_finite() && v >= 0.0)) {
            return Err(PathError::InvalidValue(
                "penalty_factor must be finite and non-negative".to_string(),
            ));
        }
    }

    if let Some(w) = weights {
        if w.len() != n {
            return Err(PathError::DimensionMismatch(format!(
                "weights has {} elements but y has {}",
                w.len(),
                n
            )));
        }
        if w.iter().any(|&v| !(v.is_finite() && v >= 0.0)) {
            return Err(PathError::InvalidValue(
                "weights must be finite and non-negative".to_string(),
            ));
        }
    }

    Ok(())
}

/// Prepend a column of ones to `x` and an unpenalized 0 to `penalty_factor`.
fn augment_intercept(x: &Array2<f64>, penalty_factor: &Array1<f64>) -> (Array2<f64>, Array1<f64>) {
    let (n, p) = x.dim();

    let mut x_aug = Array2::ones((n, p + 1));
    x_aug.slice_mut(s![.., 1..]).assign(x);

    let mut pf_aug = Array1::zeros(p + 1);
    pf_aug.slice_mut(s![1..]).assign(penalty_factor);

    (x_aug, pf_aug)
}

// =============================================================================
// Tests
// =============================================================================
