//! Error types shared across crates.

use std::fmt;

/// Invalid static configuration. Raised at construction, before the control loop runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A keyframed path needs at least two waypoints.
    TooFewWaypoints { count: usize },
    /// Waypoint `index` is earlier than the one before it.
    NonMonotonicWaypoints { index: usize },
    /// A parameter was NaN or infinite.
    NonFinite { field: &'static str },
    /// A parameter is outside its allowed range.
    OutOfRange { field: &'static str, value: f64 },
    /// A named option did not match any known value.
    UnknownValue { field: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TooFewWaypoints { count } => {
                write!(f, "keyframed path needs at least 2 waypoints, got {count}")
            }
            ConfigError::NonMonotonicWaypoints { index } => {
                write!(f, "waypoint {index} is earlier than the previous waypoint")
            }
            ConfigError::NonFinite { field } => write!(f, "{field} must be finite"),
            ConfigError::OutOfRange { field, value } => {
                write!(f, "{field} is out of range: {value}")
            }
            ConfigError::UnknownValue { field, value } => {
                write!(f, "unknown {field}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A telemetry message that could not be decoded.
#[derive(Debug)]
pub enum WireError {
    /// Not valid JSON, or JSON of the wrong shape.
    Json(serde_json::Error),
    /// Blank message.
    Empty,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Json(e) => write!(f, "malformed telemetry: {e}"),
            WireError::Empty => f.write_str("empty telemetry message"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Json(e) => Some(e),
            WireError::Empty => None,
        }
    }
}

impl From<serde_json::Error> for WireError {
    fn from(e: serde_json::Error) -> Self {
        WireError::Json(e)
    }
}

/// Fail with `NonFinite` unless `value` is finite.
pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

/// Fail unless `value` is finite and `>= 0`.
pub fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(value)
}

/// Fail unless `value` is finite and `> 0`.
pub fn ensure_positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    let value = ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(value)
}
