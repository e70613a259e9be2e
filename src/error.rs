//! Configuration error types.
//!
//! The running simulation has no error paths: a removal that finds nothing is
//! a no-op, not a failure.  Errors only appear at the configuration boundary,
//! where a bad `rain.toml` is reported and the compiled defaults are kept.

use std::fmt;

/// Top-level error enum for rainfall configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum RainError {
    /// The TOML document could not be parsed into a [`crate::config::RainConfig`].
    Parse {
        /// Parser message, including line/column when available.
        message: String,
    },

    /// A colour field is not a valid `#RRGGBB` / `#RRGGBBAA` hex string.
    InvalidColor {
        /// Dotted config key (for logging).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A numeric setting is outside the range the simulation can work with.
    OutOfRange {
        /// Dotted config key (for logging).
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for RainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RainError::Parse { message } => write!(f, "invalid rain config: {}", message),
            RainError::InvalidColor { field, value } => {
                write!(f, "'{}' = {:?} is not a hex colour", field, value)
            }
            RainError::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "'{}' = {} is outside {}", field, value, expected),
        }
    }
}

impl std::error::Error for RainError {}

impl From<toml::de::Error> for RainError {
    fn from(err: toml::de::Error) -> Self {
        RainError::Parse {
            message: err.to_string(),
        }
    }
}

/// Convenience alias: a `Result` using `RainError` as the error type.
pub type RainResult<T> = Result<T, RainError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` lies in `[0.0, 1.0]`.
pub fn validate_unit_interval(field: &'static str, value: f32) -> RainResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RainError::OutOfRange {
            field,
            value: value as f64,
            expected: "[0.0, 1.0]",
        })
    }
}

/// Returns an error unless `value` is strictly positive.
pub fn validate_positive(field: &'static str, value: f32) -> RainResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(RainError::OutOfRange {
            field,
            value: value as f64,
            expected: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is negative (or NaN).
pub fn validate_non_negative(field: &'static str, value: f32) -> RainResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(RainError::OutOfRange {
            field,
            value: value as f64,
            expected: "[0.0, ∞)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_accepts_bounds() {
        assert!(validate_unit_interval("trail.opacity", 0.0).is_ok());
        assert!(validate_unit_interval("trail.opacity", 1.0).is_ok());
    }

    #[test]
    fn unit_interval_rejects_above_one() {
        let err = validate_unit_interval("drop.opacity", 1.5).unwrap_err();
        assert!(matches!(
            err,
            RainError::OutOfRange {
                field: "drop.opacity",
                ..
            }
        ));
    }

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(validate_positive("drop.mass", 0.0).is_err());
        assert!(validate_positive("drop.mass", f32::NAN).is_err());
    }

    #[test]
    fn display_names_the_field() {
        let err = RainError::InvalidColor {
            field: "trail.color",
            value: "blue-ish".into(),
        };
        assert!(err.to_string().contains("trail.color"));
    }
}
