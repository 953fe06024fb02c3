//! Generator configuration.
//!
//! A [`GeneratorConfig`] describes one generation run: the horizon, the
//! simulated population, the dialect, the shape and how many queries to
//! produce. It is usually read from a JSON file and then overridden by
//! command-line flags.
//!
//! ```json
//! {
//!   "start": "2016-01-01T00:00:00Z",
//!   "end": "2016-01-04T00:00:00Z",
//!   "scale_var": 100,
//!   "seed": 123,
//!   "dialect": "cassandra",
//!   "shape": "single-groupby-1-1-1",
//!   "count": 1000
//! }
//! ```

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::error::{ConfigError, Result};
use crate::interval::{TimeInterval, parse_timestamp};
use crate::shape::Shape;

/// Configuration for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Horizon start, RFC 3339.
    pub start: String,

    /// Horizon end, RFC 3339.
    pub end: String,

    /// Simulated host population size.
    #[serde(default = "default_scale_var")]
    pub scale_var: usize,

    /// Seed for the random stream.
    ///
    /// `None` seeds from OS entropy, which makes the run non-reproducible.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Target dialect.
    #[serde(default = "default_dialect")]
    pub dialect: DialectKind,

    /// Shape name, e.g. `single-groupby-1-1-1`.
    ///
    /// May be left out of a file that is completed by the caller before
    /// [`validate`](GeneratorConfig::validate).
    #[serde(default)]
    pub shape: String,

    /// Number of queries to generate.
    #[serde(default = "default_count")]
    pub count: u64,
}

fn default_scale_var() -> usize {
    1
}

fn default_dialect() -> DialectKind {
    DialectKind::Cassandra
}

fn default_count() -> u64 {
    1000
}

impl GeneratorConfig {
    /// Loads and validates a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] if the file
    /// cannot be loaded, and any error from [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config from a JSON file without validating it.
    ///
    /// Lets a caller apply overrides first and [`validate`](Self::validate)
    /// the merged result once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] if the file
    /// cannot be loaded.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Besides the individual fields, checks that the shape can be generated
    /// at all under this horizon and population.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed timestamps, a zero population
    /// or count, or an unknown shape,
    /// [`IntervalError`](crate::error::IntervalError) if the horizon is empty
    /// or shorter than the shape's window, and
    /// [`InvalidParameter`](crate::error::InvalidParameter) if the shape asks
    /// for more hosts than `scale_var`.
    pub fn validate(&self) -> Result<()> {
        let horizon = self.horizon()?;

        if self.scale_var == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scale_var",
                reason: "must be > 0".to_string(),
            }
            .into());
        }

        if self.count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "count",
                reason: "must be > 0".to_string(),
            }
            .into());
        }

        self.shape()?.plan()?.check(&horizon, self.scale_var)
    }

    /// Parses the horizon.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimestamp`] for malformed timestamps and
    /// [`IntervalError::BadTimeOrder`](crate::error::IntervalError::BadTimeOrder)
    /// if `start` is not before `end`.
    pub fn horizon(&self) -> Result<TimeInterval> {
        let start = timestamp("start", &self.start)?;
        let end = timestamp("end", &self.end)?;
        TimeInterval::new(start, end)
    }

    /// Parses the shape name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the name is not in the catalog.
    pub fn shape(&self) -> Result<Shape> {
        self.shape.parse::<Shape>().map_err(|e| {
            ConfigError::InvalidValue {
                field: "shape",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Builds the random stream for this run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn timestamp(field: &'static str, value: &str) -> Result<u64> {
    parse_timestamp(value).map_err(|reason| {
        ConfigError::InvalidTimestamp {
            field,
            value: value.to_string(),
            reason,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryGenError;
    use crate::error::InvalidParameter;
    use rand::Rng;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            start: "2016-01-01T00:00:00Z".to_string(),
            end: "2016-01-04T00:00:00Z".to_string(),
            scale_var: 100,
            seed: Some(123),
            dialect: DialectKind::Cassandra,
            shape: "lastpoint".to_string(),
            count: 10,
        }
    }

    #[test]
    fn test_valid_config() {
        let c = config();
        assert!(c.validate().is_ok());
        assert_eq!(c.horizon().unwrap().span().as_secs(), 3 * 86400);
        assert_eq!(c.shape().unwrap(), Shape::LastPointPerHost);
    }

    #[test]
    fn test_invalid_values() {
        let mut c = config();
        c.scale_var = 0;
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::Config(ConfigError::InvalidValue { field: "scale_var", .. })
        ));

        let mut c = config();
        c.count = 0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.shape = "nope".to_string();
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::Config(ConfigError::InvalidValue { field: "shape", .. })
        ));

        let mut c = config();
        c.start = "not a time".to_string();
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::Config(ConfigError::InvalidTimestamp { field: "start", .. })
        ));

        let mut c = config();
        c.end = c.start.clone();
        assert!(matches!(c.validate().unwrap_err(), QueryGenError::Interval(_)));
    }

    #[test]
    fn test_shape_must_fit_population() {
        let mut c = config();
        c.scale_var = 1;
        c.shape = "single-groupby-1-8-1".to_string();
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::InvalidParameter(InvalidParameter::HostCountExceedsScale {
                requested: 8,
                scale_var: 1,
            })
        ));

        c.scale_var = 8;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_shape_window_must_fit_horizon() {
        let mut c = config();
        c.end = "2016-01-01T01:00:00Z".to_string();
        c.shape = "double-groupby-1".to_string();
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::InvalidParameter(InvalidParameter::WindowExceedsHorizon { .. })
        ));

        c.shape = "cpu-max-all-1".to_string();
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::InvalidParameter(InvalidParameter::WindowExceedsHorizon { .. })
        ));

        // Exactly one hour still fits.
        c.shape = "groupby-orderby-limit".to_string();
        assert!(c.validate().is_ok());

        let mut c = config();
        c.shape = "single-groupby-1-1-0".to_string();
        assert!(matches!(
            c.validate().unwrap_err(),
            QueryGenError::InvalidParameter(InvalidParameter::ZeroWindow)
        ));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let c = config();
        assert_eq!(c.rng().r#gen::<u64>(), c.rng().r#gen::<u64>());
    }

    #[test]
    fn test_defaults_from_json() {
        let c: GeneratorConfig = serde_json::from_str(
            r#"{"start": "2016-01-01T00:00:00Z", "end": "2016-01-02T00:00:00Z", "shape": "high-cpu-all"}"#,
        )
        .unwrap();
        assert_eq!(c.scale_var, 1);
        assert_eq!(c.count, 1000);
        assert_eq!(c.seed, None);
        assert_eq!(c.dialect, DialectKind::Cassandra);
        assert!(c.validate().is_ok());
    }
}
