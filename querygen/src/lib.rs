//! # querygen
//!
//! Reproducible devops benchmark queries for time-series databases.
//!
//! querygen turns a benchmark horizon, a simulated host population and a
//! query shape into a fully populated, dialect-agnostic [`QueryDescriptor`].
//! Every database under test receives the same query shapes drawn from the
//! same random stream, so results stay comparable across backends.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Fixed seed, fixed output: all randomness comes from one explicit stream
//! - Windows always lie inside the horizon; hosts are sampled without replacement
//! - Out-of-range host or metric counts are errors, never silently clamped
//! - One data-driven generator behind every shape and every dialect
//!
//! ## Quick Start
//!
//! ```rust
//! use querygen::{Aggregation, DevopsGenerator, DialectKind, Shape};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let start = 1_451_606_400_000_000_000u64; // 2016-01-01T00:00:00Z
//! let end = start + 24 * 3_600_000_000_000;
//!
//! let mut generator =
//!     DevopsGenerator::new(start, end, DialectKind::Cassandra, StdRng::seed_from_u64(42))?;
//!
//! let shape = Shape::MaxCpuByMinute { hosts: 4, range: Duration::from_secs(3600) };
//! let query = generator.dispatch(&shape, 100)?;
//!
//! assert_eq!(query.aggregation, Aggregation::Max);
//! assert_eq!(query.fields, vec!["usage_user"]);
//! assert_eq!(query.tag_sets[0].len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`DevopsGenerator`] — Per-dialect facade; owns horizon, stream and pool
//! - [`Shape`] — Named query pattern; parses from catalog names
//! - [`QueryDescriptor`] — The filled, dialect-agnostic output
//! - [`Dialect`] — Naming hooks that differ between databases
//!
//! ## Modules
//!
//! - [`generator`] — Dispatch facade
//! - [`shape`] — Shape table and the shared fill routine
//! - [`interval`] — Time intervals and random windows
//! - [`sampler`] — Host sampling and tag sets
//! - [`descriptor`] — Query descriptor schema
//! - [`pool`] — Descriptor recycling
//! - [`dialect`] — Dialect capability trait and built-in dialects
//! - [`config`] — Run configuration
//! - [`error`] — Error types

pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod interval;
pub mod pool;
pub mod sampler;
pub mod shape;

// Re-export primary API types at crate root for convenience.
pub use config::GeneratorConfig;
pub use descriptor::{Aggregation, ForEveryN, QueryDescriptor};
pub use dialect::{Dialect, DialectKind};
pub use error::{InvalidParameter, QueryGenError, Result};
pub use generator::DevopsGenerator;
pub use interval::TimeInterval;
pub use pool::{DescriptorPool, FreeListPool};
pub use sampler::HostSampler;
pub use shape::Shape;
