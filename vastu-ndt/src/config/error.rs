//! Configuration errors.

use thiserror::Error;

/// A configuration value violates its contract.
///
/// Returned at construction time; the matcher and grid never operate on an
/// invalid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value must be strictly positive and finite
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Value must be zero or positive and finite
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Value must be finite
    #[error("{name} must be finite, got {value}")]
    NotFinite {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Search step must be smaller than the window it steps through
    #[error("{resolution_name} ({resolution}) must be smaller than {size_name} ({size})")]
    StepExceedsWindow {
        /// Step parameter name
        resolution_name: &'static str,
        /// Step value
        resolution: f64,
        /// Window parameter name
        size_name: &'static str,
        /// Window value
        size: f64,
    },

    /// A lower bound is not below its upper bound
    #[error("{name}: min ({min}) must be below max ({max})")]
    EmptyRange {
        /// Parameter name
        name: &'static str,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Integer value must be at least one
    #[error("{name} must be at least 1")]
    Zero {
        /// Parameter name
        name: &'static str,
    },

    /// Extent and resolution need more cells than a grid may hold
    #[error("grid of {width}x{height} cells exceeds the limit of {max}")]
    GridTooLarge {
        /// Cells along x (saturated)
        width: usize,
        /// Cells along y (saturated)
        height: usize,
        /// Cell limit
        max: usize,
    },
}

impl ConfigError {
    /// Check that `value` is strictly positive and finite.
    pub fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { name, value })
        }
    }

    /// Check that `value` is zero or positive and finite.
    pub fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { name, value })
        }
    }

    /// Check that `value` is finite.
    pub fn require_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NotFinite { name, value })
        }
    }
}

/// Failure to load a configuration file.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid YAML for the config schema
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// File parsed but holds invalid values
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(ConfigError::require_positive("x", 0.5).is_ok());
        assert!(ConfigError::require_positive("x", 0.0).is_err());
        assert!(ConfigError::require_positive("x", -1.0).is_err());
        assert!(ConfigError::require_positive("x", f64::NAN).is_err());
        assert!(ConfigError::require_positive("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = ConfigError::NotPositive {
            name: "resolution",
            value: -0.25,
        };
        assert!(err.to_string().contains("resolution"));

        let err = ConfigError::StepExceedsWindow {
            resolution_name: "linear_resolution",
            resolution: 0.1,
            size_name: "linear_size",
            size: 0.05,
        };
        let msg = err.to_string();
        assert!(msg.contains("linear_resolution"));
        assert!(msg.contains("linear_size"));
    }
}
