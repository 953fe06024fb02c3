//! Dialect hooks used while filling descriptors.
//!
//! Sampling and shape logic are shared by every target database. The few
//! places where naming differs (how a host predicate is spelled, what the
//! time column is called, how labels are prefixed) go through [`Dialect`].
//! Rendering a descriptor into wire syntax is the writer's job, not this
//! trait's.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidParameter, QueryGenError};

/// Naming and formatting capabilities of a target database.
pub trait Dialect {
    /// Human-readable name, used as the prefix of every label.
    fn name(&self) -> &str;

    /// Equality predicate selecting a single host.
    fn host_predicate(&self, hostname: &str) -> String {
        format!("hostname={hostname}")
    }

    /// Name of the time column used in ORDER BY clauses.
    fn time_column(&self) -> &str {
        "timestamp"
    }

    /// ORDER BY clause for most-recent-first ordering.
    fn order_by_time_desc(&self) -> String {
        format!("{} DESC", self.time_column())
    }
}

/// The built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Apache Cassandra.
    Cassandra,
    /// TimescaleDB (PostgreSQL).
    TimescaleDb,
    /// InfluxDB (InfluxQL over HTTP).
    InfluxDb,
}

impl DialectKind {
    /// All built-in dialects.
    pub const ALL: [DialectKind; 3] = [Self::Cassandra, Self::TimescaleDb, Self::InfluxDb];

    /// The lowercase identifier accepted by [`FromStr`] and serde.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cassandra => "cassandra",
            Self::TimescaleDb => "timescaledb",
            Self::InfluxDb => "influxdb",
        }
    }
}

impl Dialect for DialectKind {
    fn name(&self) -> &str {
        match self {
            Self::Cassandra => "Cassandra",
            Self::TimescaleDb => "TimescaleDB",
            Self::InfluxDb => "InfluxDB",
        }
    }

    fn host_predicate(&self, hostname: &str) -> String {
        match self {
            Self::InfluxDb => format!("hostname = '{hostname}'"),
            Self::Cassandra | Self::TimescaleDb => format!("hostname={hostname}"),
        }
    }

    fn time_column(&self) -> &str {
        match self {
            Self::Cassandra => "timestamp_ns",
            Self::TimescaleDb | Self::InfluxDb => "time",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = QueryGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidParameter::UnknownDialect { name: s.to_string() }.into())
    }
}
