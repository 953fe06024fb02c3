//! The dialect-agnostic query descriptor.
//!
//! A [`QueryDescriptor`] is filled by exactly one shape per dispatch and then
//! handed to the caller. Dialect writers read it; the generator never touches
//! it again after returning it.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::sampler::TagSets;

/// Aggregation applied to every selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Raw rows, no aggregation.
    #[default]
    None,
    /// Maximum per group.
    Max,
    /// Mean per group.
    Avg,
}

impl Aggregation {
    /// Wire name of the aggregation; empty for [`Aggregation::None`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Max => "max",
            Self::Avg => "avg",
        }
    }
}

/// Grouping key and stride for "last point per group" queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ForEveryN {
    /// Tag the rows are grouped by.
    pub key: String,
    /// Number of most recent rows kept per group.
    pub stride: u32,
}

impl fmt::Display for ForEveryN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.key, self.stride)
    }
}

/// A fully parameterised query, independent of any wire syntax.
///
/// Optional fields left as `None` mean the clause is absent. An empty
/// `tag_sets` means no host filter, i.e. all hosts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryDescriptor {
    /// Short summary; metadata only.
    pub human_label: String,
    /// Label plus window start; metadata only.
    pub human_description: String,
    /// Aggregation applied to each field.
    pub aggregation: Aggregation,
    /// Measurement (table) name.
    pub measurement: String,
    /// Ordered field names.
    pub fields: Vec<String>,
    /// Inclusive window start, nanoseconds since the epoch.
    pub time_start: u64,
    /// Exclusive window end, nanoseconds since the epoch.
    pub time_end: u64,
    /// Time bucket width for GROUP BY.
    #[serde(with = "duration_opt_serde")]
    pub group_by: Option<Duration>,
    /// ORDER BY clause.
    pub order_by: Option<String>,
    /// Row limit.
    pub limit: Option<u32>,
    /// Host filter.
    pub tag_sets: TagSets,
    /// Encoded value predicate, `field,op,value`.
    pub where_clause: Option<String>,
    /// Per-group latest-row selection.
    pub for_every_n: Option<ForEveryN>,
}

impl QueryDescriptor {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every field while keeping allocated buffers.
    pub fn reset(&mut self) {
        self.human_label.clear();
        self.human_description.clear();
        self.aggregation = Aggregation::None;
        self.measurement.clear();
        self.fields.clear();
        self.time_start = 0;
        self.time_end = 0;
        self.group_by = None;
        self.order_by = None;
        self.limit = None;
        self.tag_sets.clear();
        self.where_clause = None;
        self.for_every_n = None;
    }

    /// Field names joined with commas, for writers that take a single list.
    pub fn fields_joined(&self) -> String {
        self.fields.join(",")
    }

    /// Number of host predicates across all tag sets.
    pub fn host_count(&self) -> usize {
        self.tag_sets.iter().map(Vec::len).sum()
    }
}

mod duration_opt_serde {
    use std::time::Duration;

    use serde::{Serialize, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_secs_f64()).serialize(serializer)
    }
}
