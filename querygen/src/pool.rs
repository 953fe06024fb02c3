//! Descriptor recycling.
//!
//! Long benchmark runs generate millions of descriptors. A pool lets callers
//! hand finished descriptors back so their buffers are reused.

use crate::descriptor::QueryDescriptor;

/// Source of reset descriptors.
///
/// Every descriptor returned by [`acquire`](Self::acquire) must have all
/// fields cleared, and is owned exclusively by the caller from then on.
pub trait DescriptorPool {
    /// Returns a fully reset descriptor.
    fn acquire(&mut self) -> QueryDescriptor;

    /// Takes a descriptor back for later reuse.
    fn release(&mut self, descriptor: QueryDescriptor);
}

/// Default idle capacity of a [`FreeListPool`].
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Bounded free list of descriptors, reset on acquire.
#[derive(Debug)]
pub struct FreeListPool {
    free: Vec<QueryDescriptor>,
    max_idle: usize,
}

impl FreeListPool {
    /// Creates a pool holding at most `max_idle` released descriptors.
    pub fn new(max_idle: usize) -> Self {
        Self {
            free: Vec::new(),
            max_idle,
        }
    }

    /// Number of descriptors waiting to be reused.
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

impl Default for FreeListPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl DescriptorPool for FreeListPool {
    fn acquire(&mut self) -> QueryDescriptor {
        match self.free.pop() {
            Some(mut q) => {
                q.reset();
                q
            }
            None => QueryDescriptor::new(),
        }
    }

    fn release(&mut self, descriptor: QueryDescriptor) {
        if self.free.len() < self.max_idle {
            self.free.push(descriptor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ForEveryN;

    #[test]
    fn test_acquire_returns_reset_descriptor() {
        let mut pool = FreeListPool::default();

        let mut q = pool.acquire();
        q.measurement = "cpu".to_string();
        q.limit = Some(5);
        q.for_every_n = Some(ForEveryN {
            key: "hostname".to_string(),
            stride: 1,
        });
        pool.release(q);
        assert_eq!(pool.idle(), 1);

        let reused = pool.acquire();
        assert_eq!(reused, QueryDescriptor::new());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_release_respects_max_idle() {
        let mut pool = FreeListPool::new(2);
        for _ in 0..5 {
            pool.release(QueryDescriptor::new());
        }
        assert_eq!(pool.idle(), 2);
    }
}
