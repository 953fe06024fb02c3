//! Query shapes and the single data-driven generator behind them.
//!
//! A [`Shape`] names a fixed query pattern plus its runtime parameters (host
//! count, time range, metric count). [`Shape::plan`] turns it into a
//! [`ShapePlan`], a plain table row describing the window policy, host
//! selection, aggregation, fields and extra clauses. [`ShapePlan::fill`] is
//! the one routine that samples randomness and writes a descriptor; every
//! shape goes through it.
//!
//! # Shape names
//!
//! Shapes parse from and print as the conventional devops query-type names:
//!
//! | Name | Shape |
//! |---|---|
//! | `single-groupby-1-<hosts>-<hours>` | max cpu by minute |
//! | `single-groupby-5-<hosts>-<hours>` | 5 cpu metrics by minute |
//! | `groupby-orderby-limit` | max cpu, last 5 minutes of the horizon |
//! | `double-groupby-<n>` / `double-groupby-all` | mean of n metrics, all hosts, by hour |
//! | `cpu-max-all-<hosts>` | max of all cpu metrics by hour |
//! | `lastpoint` | most recent row per host |
//! | `high-cpu-<hosts>` / `high-cpu-all` | rows where usage_user > 90 |
//!
//! `<hours>` may also carry a unit suffix (`30m`, `90s`, `2d`).
//!
//! ```rust
//! use querygen::Shape;
//! use std::time::Duration;
//!
//! let shape: Shape = "single-groupby-1-8-1".parse().unwrap();
//! assert_eq!(shape, Shape::MaxCpuByMinute { hosts: 8, range: Duration::from_secs(3600) });
//! assert_eq!(shape.to_string(), "single-groupby-1-8-1");
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;

use crate::descriptor::{Aggregation, ForEveryN, QueryDescriptor};
use crate::dialect::Dialect;
use crate::error::{InvalidParameter, QueryGenError, Result};
use crate::interval::{TimeInterval, format_duration};
use crate::sampler::HostSampler;

/// Measurement every devops shape queries.
pub const MEASUREMENT: &str = "cpu";

/// All cpu metrics, in the order shapes select them.
pub static CPU_METRICS: [&str; 10] = [
    "usage_user",
    "usage_system",
    "usage_idle",
    "usage_nice",
    "usage_iowait",
    "usage_irq",
    "usage_softirq",
    "usage_steal",
    "usage_guest",
    "usage_guest_nice",
];

/// The five metrics selected by the 5-metric shape.
pub static CPU_5_METRICS: [&str; 5] = [
    "usage_user",
    "usage_system",
    "usage_idle",
    "usage_nice",
    "usage_guest",
];

/// Value predicate used by the high-cpu shape.
pub const HIGH_CPU_WHERE: &str = "usage_user,>,90.0";

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// A named query pattern with its runtime parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Max of `usage_user` per minute over a random `range` for `hosts` hosts.
    MaxCpuByMinute {
        /// Number of hosts to filter on.
        hosts: usize,
        /// Window length.
        range: Duration,
    },
    /// Max of five cpu metrics per minute over a random `range` for `hosts` hosts.
    Cpu5Metrics {
        /// Number of hosts to filter on.
        hosts: usize,
        /// Window length.
        range: Duration,
    },
    /// Max of `usage_user` per minute over the last hour, newest 5 buckets.
    GroupByOrderByLimit,
    /// Mean of the first `metrics` cpu metrics per hour over a random day.
    MeanMetricsAllHostsByHour {
        /// Number of metrics, taken from the front of [`CPU_METRICS`].
        metrics: usize,
    },
    /// Max of every cpu metric per hour over a random 8 hours for `hosts` hosts.
    MaxAllCpu {
        /// Number of hosts to filter on.
        hosts: usize,
    },
    /// Most recent row of every host over the whole horizon.
    LastPointPerHost,
    /// Rows with `usage_user > 90` over a random day, by hour; `hosts == 0` means all hosts.
    HighCpuForHosts {
        /// Number of hosts to filter on, or 0 for all.
        hosts: usize,
    },
}

/// How a shape derives its time window from the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// A window of this length at a random offset.
    Random(Duration),
    /// The final window of this length, ending at the horizon end.
    Tail(Duration),
    /// The entire horizon.
    Horizon,
}

/// One row of the shape table, ready to be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePlan {
    /// Window derivation.
    pub window: WindowPolicy,
    /// Hosts to sample; 0 leaves the query unfiltered.
    pub hosts: usize,
    /// Aggregation applied to each field.
    pub aggregation: Aggregation,
    /// Ordered field names.
    pub fields: &'static [&'static str],
    /// Time bucket width.
    pub group_by: Option<Duration>,
    /// Whether to order newest first.
    pub order_by_time_desc: bool,
    /// Row limit.
    pub limit: Option<u32>,
    /// Encoded value predicate.
    pub where_clause: Option<&'static str>,
    /// Grouping key and stride for latest-row selection.
    pub for_every_n: Option<(&'static str, u32)>,
    /// Label text following the dialect name.
    pub summary: String,
}

impl Shape {
    /// The pattern name, independent of parameters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MaxCpuByMinute { .. } => "max-cpu-by-minute-N-hosts",
            Self::Cpu5Metrics { .. } => "cpu-5-metrics-N-hosts",
            Self::GroupByOrderByLimit => "group-by-order-by-limit",
            Self::MeanMetricsAllHostsByHour { .. } => "mean-N-metrics-all-hosts-by-hour",
            Self::MaxAllCpu { .. } => "max-all-cpu-N-hosts",
            Self::LastPointPerHost => "last-point-per-host",
            Self::HighCpuForHosts { .. } => "high-cpu-for-hosts",
        }
    }

    /// The standard instantiations used by devops benchmark runs.
    pub fn catalog() -> Vec<Shape> {
        let mut shapes: Vec<Shape> = [1, 2, 4, 8, 16, 32]
            .into_iter()
            .map(|hosts| Self::MaxCpuByMinute { hosts, range: HOUR })
            .collect();

        shapes.extend([
            Self::MaxCpuByMinute {
                hosts: 1,
                range: 12 * HOUR,
            },
            Self::Cpu5Metrics { hosts: 1, range: HOUR },
            Self::Cpu5Metrics {
                hosts: 1,
                range: 12 * HOUR,
            },
            Self::Cpu5Metrics { hosts: 8, range: HOUR },
            Self::GroupByOrderByLimit,
            Self::MeanMetricsAllHostsByHour { metrics: 1 },
            Self::MeanMetricsAllHostsByHour { metrics: 5 },
            Self::MeanMetricsAllHostsByHour {
                metrics: CPU_METRICS.len(),
            },
            Self::MaxAllCpu { hosts: 1 },
            Self::MaxAllCpu { hosts: 8 },
            Self::LastPointPerHost,
            Self::HighCpuForHosts { hosts: 1 },
            Self::HighCpuForHosts { hosts: 0 },
        ]);

        shapes
    }

    /// Resolves this shape into its table row.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter::ZeroMetrics`] or
    /// [`InvalidParameter::MetricCountExceedsList`] if a metric count is out
    /// of range, and [`InvalidParameter::ZeroWindow`] for a zero range.
    pub fn plan(&self) -> Result<ShapePlan> {
        let base = ShapePlan {
            window: WindowPolicy::Horizon,
            hosts: 0,
            aggregation: Aggregation::None,
            fields: &CPU_METRICS,
            group_by: None,
            order_by_time_desc: false,
            limit: None,
            where_clause: None,
            for_every_n: None,
            summary: String::new(),
        };

        let plan = match *self {
            Self::MaxCpuByMinute { hosts, range } => ShapePlan {
                window: WindowPolicy::Random(nonzero(range)?),
                hosts,
                aggregation: Aggregation::Max,
                fields: &CPU_METRICS[..1],
                group_by: Some(MINUTE),
                summary: format!(
                    "max cpu, rand {hosts:4} hosts, rand {} by 1m",
                    format_duration(range)
                ),
                ..base
            },
            Self::Cpu5Metrics { hosts, range } => ShapePlan {
                window: WindowPolicy::Random(nonzero(range)?),
                hosts,
                aggregation: Aggregation::Max,
                fields: &CPU_5_METRICS,
                group_by: Some(MINUTE),
                summary: format!(
                    "5 cpu metrics, rand {hosts:4} hosts, rand {} by 1m",
                    format_duration(range)
                ),
                ..base
            },
            Self::GroupByOrderByLimit => ShapePlan {
                window: WindowPolicy::Tail(HOUR),
                aggregation: Aggregation::Max,
                fields: &CPU_METRICS[..1],
                group_by: Some(MINUTE),
                order_by_time_desc: true,
                limit: Some(5),
                summary: "max cpu over last 5 min-intervals".to_string(),
                ..base
            },
            Self::MeanMetricsAllHostsByHour { metrics } => {
                if metrics == 0 {
                    return Err(InvalidParameter::ZeroMetrics.into());
                }
                let fields = CPU_METRICS.get(..metrics).ok_or(
                    InvalidParameter::MetricCountExceedsList {
                        requested: metrics,
                        available: CPU_METRICS.len(),
                    },
                )?;
                ShapePlan {
                    window: WindowPolicy::Random(24 * HOUR),
                    aggregation: Aggregation::Avg,
                    fields,
                    group_by: Some(HOUR),
                    summary: format!("mean of {metrics} metrics, all hosts, rand 1d by 1h"),
                    ..base
                }
            }
            Self::MaxAllCpu { hosts } => ShapePlan {
                window: WindowPolicy::Random(8 * HOUR),
                hosts,
                aggregation: Aggregation::Max,
                group_by: Some(HOUR),
                summary: format!("max cpu all fields, rand {hosts:4} hosts, rand 8h by 1h"),
                ..base
            },
            Self::LastPointPerHost => ShapePlan {
                for_every_n: Some(("hostname", 1)),
                summary: "last row per host".to_string(),
                ..base
            },
            Self::HighCpuForHosts { hosts } => ShapePlan {
                window: WindowPolicy::Random(24 * HOUR),
                hosts,
                group_by: Some(HOUR),
                where_clause: Some(HIGH_CPU_WHERE),
                summary: if hosts == 0 {
                    "CPU over threshold, all hosts".to_string()
                } else {
                    format!("CPU over threshold, {hosts} hosts")
                },
                ..base
            },
        };

        Ok(plan)
    }
}

impl ShapePlan {
    /// Checks that this plan can be filled for `scale_var` hosts over `horizon`.
    ///
    /// Touches no randomness.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter::ZeroScale`] for an empty population,
    /// [`InvalidParameter::HostCountExceedsScale`] if the plan needs more
    /// hosts than exist, and [`InvalidParameter::WindowExceedsHorizon`] if
    /// the window does not fit in `horizon`.
    pub fn check(&self, horizon: &TimeInterval, scale_var: usize) -> Result<()> {
        if scale_var == 0 {
            return Err(InvalidParameter::ZeroScale.into());
        }
        if self.hosts > scale_var {
            return Err(InvalidParameter::HostCountExceedsScale {
                requested: self.hosts,
                scale_var,
            }
            .into());
        }
        match self.window {
            WindowPolicy::Random(d) | WindowPolicy::Tail(d) => {
                horizon.tail_window(d)?;
            }
            WindowPolicy::Horizon => {}
        }
        Ok(())
    }

    /// Samples a window and hosts and writes the complete descriptor.
    ///
    /// [`check`](Self::check) runs before the stream is touched, so a failed
    /// call consumes no randomness. On success the window is drawn first and
    /// the hosts second.
    ///
    /// # Errors
    ///
    /// Same conditions as [`check`](Self::check).
    pub fn fill<R, D>(
        &self,
        horizon: &TimeInterval,
        scale_var: usize,
        dialect: &D,
        rng: &mut R,
        q: &mut QueryDescriptor,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        D: Dialect + ?Sized,
    {
        self.check(horizon, scale_var)?;

        let window = match self.window {
            WindowPolicy::Random(d) => horizon.rand_window(d, rng)?,
            WindowPolicy::Tail(d) => horizon.tail_window(d)?,
            WindowPolicy::Horizon => *horizon,
        };
        let tag_sets = HostSampler.tag_sets(scale_var, self.hosts, dialect, rng)?;

        let label = format!("{} {}", dialect.name(), self.summary);
        q.human_description = format!("{label}: {}", window.start_string());
        q.human_label = label;

        q.aggregation = self.aggregation;
        q.measurement = MEASUREMENT.to_string();
        q.fields = self.fields.iter().map(|f| (*f).to_string()).collect();

        q.time_start = window.start();
        q.time_end = window.end();
        q.group_by = self.group_by;
        q.order_by = self.order_by_time_desc.then(|| dialect.order_by_time_desc());
        q.limit = self.limit;
        q.tag_sets = tag_sets;
        q.where_clause = self.where_clause.map(str::to_string);
        q.for_every_n = self.for_every_n.map(|(key, stride)| ForEveryN {
            key: key.to_string(),
            stride,
        });

        Ok(())
    }
}

fn nonzero(range: Duration) -> Result<Duration> {
    if range.is_zero() {
        return Err(InvalidParameter::ZeroWindow.into());
    }
    Ok(range)
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxCpuByMinute { hosts, range } => {
                write!(f, "single-groupby-1-{hosts}-{}", range_name(*range))
            }
            Self::Cpu5Metrics { hosts, range } => {
                write!(f, "single-groupby-5-{hosts}-{}", range_name(*range))
            }
            Self::GroupByOrderByLimit => f.write_str("groupby-orderby-limit"),
            Self::MeanMetricsAllHostsByHour { metrics } if *metrics == CPU_METRICS.len() => {
                f.write_str("double-groupby-all")
            }
            Self::MeanMetricsAllHostsByHour { metrics } => write!(f, "double-groupby-{metrics}"),
            Self::MaxAllCpu { hosts } => write!(f, "cpu-max-all-{hosts}"),
            Self::LastPointPerHost => f.write_str("lastpoint"),
            Self::HighCpuForHosts { hosts: 0 } => f.write_str("high-cpu-all"),
            Self::HighCpuForHosts { hosts } => write!(f, "high-cpu-{hosts}"),
        }
    }
}

/// Whole hours print as a bare number; anything else keeps its unit.
///
/// Sub-second ranges have no name that parses back.
fn range_name(range: Duration) -> String {
    let secs = range.as_secs();
    if range.subsec_nanos() == 0 && secs > 0 && secs.is_multiple_of(3600) {
        (secs / 3600).to_string()
    } else {
        format_duration(range)
    }
}

/// Parses a range segment: a bare number of hours, or a number with an
/// `s`, `m`, `h` or `d` suffix.
fn parse_range(s: &str) -> Option<Duration> {
    let (num, unit_secs) = match s.char_indices().last()? {
        (i, 's') => (&s[..i], 1),
        (i, 'm') => (&s[..i], 60),
        (i, 'h') => (&s[..i], 3600),
        (i, 'd') => (&s[..i], 86400),
        _ => (s, 3600),
    };
    num.parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(unit_secs))
        .map(Duration::from_secs)
}

impl FromStr for Shape {
    type Err = QueryGenError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || -> QueryGenError {
            InvalidParameter::UnknownShape {
                name: name.to_string(),
            }
            .into()
        };
        let count = |v: &str| v.parse::<usize>().map_err(|_| unknown());

        match name {
            "groupby-orderby-limit" => return Ok(Self::GroupByOrderByLimit),
            "lastpoint" => return Ok(Self::LastPointPerHost),
            "double-groupby-all" => {
                return Ok(Self::MeanMetricsAllHostsByHour {
                    metrics: CPU_METRICS.len(),
                });
            }
            "high-cpu-all" => return Ok(Self::HighCpuForHosts { hosts: 0 }),
            _ => {}
        }

        if let Some(rest) = name.strip_prefix("single-groupby-") {
            let parts: Vec<&str> = rest.split('-').collect();
            let [metrics, hosts, hours] = parts.as_slice() else {
                return Err(unknown());
            };
            let hosts = count(*hosts)?;
            let range = parse_range(hours).ok_or_else(unknown)?;

            return match *metrics {
                "1" => Ok(Self::MaxCpuByMinute { hosts, range }),
                "5" => Ok(Self::Cpu5Metrics { hosts, range }),
                _ => Err(unknown()),
            };
        }
        if let Some(n) = name.strip_prefix("double-groupby-") {
            return Ok(Self::MeanMetricsAllHostsByHour { metrics: count(n)? });
        }
        if let Some(n) = name.strip_prefix("cpu-max-all-") {
            return Ok(Self::MaxAllCpu { hosts: count(n)? });
        }
        if let Some(n) = name.strip_prefix("high-cpu-") {
            return Ok(Self::HighCpuForHosts { hosts: count(n)? });
        }

        Err(unknown())
    }
}
