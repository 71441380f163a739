// =============================================================================
// Regression Families
// =============================================================================
//
// Only the Gaussian (linear) family runs end to end with standardization.
// Any other family is fit on the raw design: standardization is switched
// off and a requested intercept becomes an explicit, unpenalized column of
// ones. Whether a solver exists for that family is up to the factory.
//
// =============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// Distribution family of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Family {
    /// Linear regression with squared-error loss.
    #[default]
    Gaussian,
    /// Logistic regression. No built-in solver yet.
    Binomial,
}

impl Family {
    /// Canonical lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Gaussian => "gaussian",
            Family::Binomial => "binomial",
        }
    }

    /// Whether the standardization transform and intercept recovery apply.
    pub fn supports_standardization(&self) -> bool {
        matches!(self, Family::Gaussian)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" | "linear" | "normal" => Ok(Family::Gaussian),
            "binomial" | "logistic" => Ok(Family::Binomial),
            other => Err(PathError::UnknownFamily(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("gaussian".parse::<Family>().unwrap(), Family::Gaussian);
        assert_eq!(" Binomial ".parse::<Family>().unwrap(), Family::Binomial);
        assert!(matches!(
            "poisson".parse::<Family>(),
            Err(PathError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_only_gaussian_standardizes() {
        assert!(Family::Gaussian.supports_standardization());
        assert!(!Family::Binomial.supports_standardization());
        assert_eq!(Family::Binomial.to_string(), "binomial");
    }
}
