//! The per-dialect generator facade.
//!
//! A [`DevopsGenerator`] owns the benchmark horizon, the random stream, a
//! dialect and a descriptor pool. Each [`dispatch`](DevopsGenerator::dispatch)
//! resolves a shape, fills one descriptor and hands it to the caller.
//!
//! # Concurrency
//!
//! Dispatch takes `&mut self`: window and host sampling both consume the one
//! stream, and a fixed seed only reproduces a run if that consumption is
//! strictly ordered. Parallel producers should each own a generator with an
//! independently seeded stream.
//!
//! # Example
//!
//! ```rust
//! use querygen::{DevopsGenerator, DialectKind, Shape};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let start = 1_451_606_400_000_000_000u64;
//! let end = start + 3 * 24 * 3_600_000_000_000;
//!
//! let mut generator =
//!     DevopsGenerator::new(start, end, DialectKind::TimescaleDb, StdRng::seed_from_u64(123))?;
//!
//! let shape: Shape = "cpu-max-all-8".parse()?;
//! let query = generator.dispatch(&shape, 100)?;
//! assert_eq!(query.fields.len(), 10);
//! assert_eq!(query.tag_sets[0].len(), 8);
//!
//! generator.recycle(query);
//! # Ok(())
//! # }
//! ```

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::descriptor::QueryDescriptor;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::interval::TimeInterval;
use crate::pool::{DescriptorPool, FreeListPool};
use crate::shape::Shape;

/// Generates devops queries for one dialect over a fixed horizon.
#[derive(Debug)]
pub struct DevopsGenerator<D, R = StdRng, P = FreeListPool> {
    horizon: TimeInterval,
    dialect: D,
    rng: R,
    pool: P,
}

impl<D: Dialect, R: Rng> DevopsGenerator<D, R, FreeListPool> {
    /// Creates a generator over `[start, end)` with a default pool.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::BadTimeOrder`](crate::error::IntervalError::BadTimeOrder)
    /// if `start` is not strictly before `end`. No generator exists in that
    /// state.
    pub fn new(start: u64, end: u64, dialect: D, rng: R) -> Result<Self> {
        Self::with_pool(start, end, dialect, rng, FreeListPool::default())
    }
}

impl<D: Dialect, R: Rng, P: DescriptorPool> DevopsGenerator<D, R, P> {
    /// Creates a generator over `[start, end)` drawing descriptors from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::BadTimeOrder`](crate::error::IntervalError::BadTimeOrder)
    /// if `start` is not strictly before `end`.
    pub fn with_pool(start: u64, end: u64, dialect: D, rng: R, pool: P) -> Result<Self> {
        let horizon = TimeInterval::new(start, end)?;
        Ok(Self::from_horizon(horizon, dialect, rng, pool))
    }

    /// Creates a generator from an already validated horizon.
    pub fn from_horizon(horizon: TimeInterval, dialect: D, rng: R, pool: P) -> Self {
        debug!(
            start = %horizon.start_string(),
            end = %horizon.end_string(),
            dialect = dialect.name(),
            "generator ready"
        );
        Self {
            horizon,
            dialect,
            rng,
            pool,
        }
    }

    /// The benchmark horizon every window is drawn from.
    pub fn horizon(&self) -> &TimeInterval {
        &self.horizon
    }

    /// The dialect hooks used when filling descriptors.
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Fills a descriptor for `shape` against a population of `scale_var` hosts.
    ///
    /// The descriptor comes from the pool fully reset and belongs to the
    /// caller on return. Two calls with the same shape agree on aggregation,
    /// measurement, fields and group-by; windows and hosts are freshly drawn.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::InvalidParameter) if the
    /// shape asks for more hosts than `scale_var`, more metrics than exist, or
    /// a window longer than the horizon. Nothing is clamped.
    pub fn dispatch(&mut self, shape: &Shape, scale_var: usize) -> Result<QueryDescriptor> {
        let plan = shape.plan()?;
        let mut q = self.pool.acquire();

        if let Err(e) = plan.fill(&self.horizon, scale_var, &self.dialect, &mut self.rng, &mut q) {
            debug!(shape = %shape, scale_var, error = %e, "dispatch rejected");
            self.pool.release(q);
            return Err(e);
        }

        trace!(
            shape = %shape,
            start = q.time_start,
            end = q.time_end,
            hosts = q.host_count(),
            "sampled"
        );
        debug!(shape = %shape, scale_var, dialect = self.dialect.name(), "dispatched");
        Ok(q)
    }

    /// Hands a finished descriptor back to the pool.
    pub fn recycle(&mut self, descriptor: QueryDescriptor) {
        self.pool.release(descriptor);
    }
}
