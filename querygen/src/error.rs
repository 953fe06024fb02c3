//! Error types for devops query generation.

use std::time::Duration;

use thiserror::Error;

/// The main error type for all query generation operations.
///
/// Generation performs no I/O, so every failure here is terminal for the
/// call that produced it. Nothing is retried and nothing is clamped.
#[derive(Error, Debug)]
pub enum QueryGenError {
    /// A time interval or generator horizon violated its ordering invariant.
    #[error("interval error: {0}")]
    Interval(#[from] IntervalError),

    /// A per-call parameter was outside what the shape or population allows.
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] InvalidParameter),

    /// Configuration could not be loaded or failed validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised when constructing a [`TimeInterval`](crate::interval::TimeInterval).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntervalError {
    /// The start instant is not strictly before the end instant.
    #[error("bad time order: start {start} is not before end {end}")]
    BadTimeOrder {
        /// Start of the rejected interval, in nanoseconds since the epoch.
        start: u64,
        /// End of the rejected interval, in nanoseconds since the epoch.
        end: u64,
    },
}

/// Per-call parameter violations.
///
/// Each of these would otherwise silently change what a benchmark measures,
/// so they are surfaced to the caller instead of being corrected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidParameter {
    /// More hosts were requested than the simulated population holds.
    #[error("requested {requested} hosts but scale_var is {scale_var}")]
    HostCountExceedsScale {
        /// Number of hosts requested.
        requested: usize,
        /// Size of the simulated host population.
        scale_var: usize,
    },

    /// The simulated host population is empty.
    #[error("scale_var must be > 0")]
    ZeroScale,

    /// More metrics were requested than the fixed metric list holds.
    #[error("requested {requested} metrics but only {available} are available")]
    MetricCountExceedsList {
        /// Number of metrics requested.
        requested: usize,
        /// Length of the fixed metric list.
        available: usize,
    },

    /// A metric count of zero leaves the query without fields.
    #[error("metric count must be > 0")]
    ZeroMetrics,

    /// The requested window does not fit inside the horizon.
    #[error("window {window:?} exceeds horizon span {span:?}")]
    WindowExceedsHorizon {
        /// Requested window length.
        window: Duration,
        /// Length of the interval the window must fit in.
        span: Duration,
    },

    /// A zero-length window cannot be a valid interval.
    #[error("window length must be > 0")]
    ZeroWindow,

    /// The shape name is not part of the catalog.
    #[error("unknown shape '{name}'")]
    UnknownShape {
        /// The name that failed to parse.
        name: String,
    },

    /// The dialect name is not one of the built-in dialects.
    #[error("unknown dialect '{name}'")]
    UnknownDialect {
        /// The name that failed to parse.
        name: String,
    },
}

/// Errors that can occur while loading or validating a [`GeneratorConfig`](crate::config::GeneratorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        /// The config file path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a generator config.
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        /// The config file path.
        path: std::path::PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A timestamp is not valid RFC 3339.
    #[error("invalid timestamp '{value}' for {field}: {reason}")]
    InvalidTimestamp {
        /// Which config field held the timestamp.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A field holds a value outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The offending config field.
        field: &'static str,
        /// Description of the constraint that was violated.
        reason: String,
    },
}

/// Type alias for `Result<T, QueryGenError>`.
pub type Result<T> = std::result::Result<T, QueryGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err: QueryGenError = InvalidParameter::HostCountExceedsScale {
            requested: 5,
            scale_var: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid parameter: requested 5 hosts but scale_var is 3"
        );
    }

    #[test]
    fn test_interval_error_message() {
        let err: QueryGenError = IntervalError::BadTimeOrder { start: 10, end: 10 }.into();
        assert!(err.to_string().contains("start 10 is not before end 10"));
    }
}
