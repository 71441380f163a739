// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible operation in the crate returns `Result<T>`.
//
// Numeric degeneracies (zero-variance columns) are NOT errors: they are
// absorbed by the standardization fallback. Hitting the iteration cap is not
// an error either; it shows up as an iteration count equal to the cap.
//
// =============================================================================

use thiserror::Error;

/// Errors raised while validating inputs or setting up a path fit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Array lengths that must agree do not.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An input has no rows or no columns.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A value is outside its allowed domain.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The family/shape combination has no solver.
    ///
    /// Raised before any solver is constructed or called.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The λ sequence cannot be used for warm-started continuation.
    #[error("Invalid lambda sequence: {0}")]
    InvalidLambdaSequence(String),

    /// A family name that is not recognised.
    #[error("Unknown family: {0}")]
    UnknownFamily(String),

    /// A decomposition inside a solver failed.
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PathError>;
