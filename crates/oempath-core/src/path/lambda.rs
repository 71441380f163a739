//! λ sequences: automatic generation and validation of caller-supplied ones.

use ndarray::Array1;

use crate::error::{PathError, Result};

/// Generate `count` values from `lambda_max` down to `min_ratio * lambda_max`,
/// evenly spaced on the log scale.
///
/// The endpoints are exactly `lambda_max` and `min_ratio * lambda_max`; the
/// interior points are `exp` of a linear grid between their logs. A single
/// value is just `lambda_max`.
pub fn generate_lambda_sequence(lambda_max: f64, count: usize, min_ratio: f64) -> Result<Array1<f64>> {
    if !(lambda_max.is_finite() && lambda_max > 0.0) {
        return Err(PathError::InvalidLambdaSequence(format!(
            "lambda_max must be positive and finite, got {} (is the response identically zero?)",
            lambda_max
        )));
    }
    validate_auto_options(count, min_ratio)?;

    if count == 1 {
        return Ok(Array1::from_elem(1, lambda_max));
    }

    let lambda_min = min_ratio * lambda_max;
    let mut lambda = Array1::linspace(lambda_max.ln(), lambda_min.ln(), count).mapv(f64::exp);
    lambda[0] = lambda_max;
    lambda[count - 1] = lambda_min;
    Ok(lambda)
}

/// Check the options of an automatically generated sequence.
pub fn validate_auto_options(count: usize, min_ratio: f64) -> Result<()> {
    if count == 0 {
        return Err(PathError::InvalidValue(
            "number of lambda values must be at least 1".to_string(),
        ));
    }
    if !(min_ratio > 0.0 && min_ratio <= 1.0) {
        return Err(PathError::InvalidValue(format!(
            "lambda min ratio must be in (0, 1], got {}",
            min_ratio
        )));
    }
    Ok(())
}

/// Check that an explicit sequence can drive warm-started continuation.
///
/// Values must be positive, finite and non-increasing. Repeated values are
/// allowed.
pub fn validate_lambda_sequence(lambda: &[f64]) -> Result<()> {
    if lambda.is_empty() {
        return Err(PathError::InvalidLambdaSequence(
            "sequence is empty".to_string(),
        ));
    }
    if let Some((i, &l)) = lambda
        .iter()
        .enumerate()
        .find(|(_, &l)| !(l.is_finite() && l > 0.0))
    {
        return Err(PathError::InvalidLambdaSequence(format!(
            "lambda[{}] = {} is not a positive finite value",
            i, l
        )));
    }
    if let Some(i) = (1..lambda.len()).find(|&i| lambda[i] > lambda[i - 1]) {
        return Err(PathError::InvalidLambdaSequence(format!(
            "sequence must be non-increasing for warm starts, but lambda[{}] = {} > lambda[{}] = {}",
            i,
            lambda[i],
            i - 1,
            lambda[i - 1]
        )));
    }
    Ok(())
}
