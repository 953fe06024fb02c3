//! Host subset sampling.
//!
//! Hosts in the simulated population are identified by index `0..scale_var`
//! and named `host_<index>`. A query targeting `n` hosts draws `n` distinct
//! indices without replacement.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::dialect::Dialect;
use crate::error::{InvalidParameter, Result};

/// Tag sets: an outer conjunction of inner disjunctions of equality predicates.
pub type TagSets = Vec<Vec<String>>;

/// Draws distinct host indices from a fixed-size population.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSampler;

impl HostSampler {
    /// Returns `n` distinct indices in `[0, scale_var)`.
    ///
    /// The whole population is materialised and the first `n` positions are
    /// shuffled, so every `n`-subset (and every ordering of it) is equally
    /// likely. Cost is proportional to `scale_var`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter::HostCountExceedsScale`] if `n > scale_var`.
    pub fn sample<R: Rng + ?Sized>(&self, scale_var: usize, n: usize, rng: &mut R) -> Result<Vec<usize>> {
        if n > scale_var {
            return Err(InvalidParameter::HostCountExceedsScale {
                requested: n,
                scale_var,
            }
            .into());
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut population: Vec<usize> = (0..scale_var).collect();
        let (chosen, _) = population.partial_shuffle(rng, n);
        Ok(chosen.to_vec())
    }

    /// Samples `n` hosts and renders them as tag sets for `dialect`.
    ///
    /// `n == 0` means "all hosts" and yields no tag sets at all, rather than
    /// one empty group.
    ///
    /// # Errors
    ///
    /// Same conditions as [`sample`](Self::sample).
    pub fn tag_sets<R: Rng + ?Sized, D: Dialect + ?Sized>(
        &self,
        scale_var: usize,
        n: usize,
        dialect: &D,
        rng: &mut R,
    ) -> Result<TagSets> {
        let indices = self.sample(scale_var, n, rng)?;
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        let group = indices
            .into_iter()
            .map(|i| dialect.host_predicate(&hostname(i)))
            .collect();
        Ok(vec![group])
    }
}

/// Maps a host index to its identifier.
pub fn hostname(index: usize) -> String {
    format!("host_{index}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::dialect::DialectKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for scale_var in [1usize, 2, 7, 100] {
            for n in 0..=scale_var {
                let hosts = HostSampler.sample(scale_var, n, &mut rng).unwrap();
                assert_eq!(hosts.len(), n);
                assert!(hosts.iter().all(|&h| h < scale_var));
                let unique: HashSet<_> = hosts.iter().collect();
                assert_eq!(unique.len(), n);
            }
        }
    }

    #[test]
    fn test_sample_full_population_is_permutation() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut hosts = HostSampler.sample(50, 50, &mut rng).unwrap();
        hosts.sort_unstable();
        assert_eq!(hosts, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_more_than_population_fails() {
        let mut rng = StdRng::seed_from_u64(13);
        let err = HostSampler.sample(3, 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            crate::QueryGenError::InvalidParameter(InvalidParameter::HostCountExceedsScale {
                requested: 5,
                scale_var: 3,
            })
        ));
    }

    #[test]
    fn test_tag_sets_zero_hosts_is_empty() {
        let mut rng = StdRng::seed_from_u64(14);
        let tags = HostSampler
            .tag_sets(10, 0, &DialectKind::Cassandra, &mut rng)
            .unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_tag_sets_single_group() {
        let mut rng = StdRng::seed_from_u64(15);
        let tags = HostSampler
            .tag_sets(10, 4, &DialectKind::Cassandra, &mut rng)
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].len(), 4);
        assert!(tags[0].iter().all(|t| t.starts_with("hostname=host_")));
    }

    #[test]
    fn test_every_host_reachable() {
        let mut rng = StdRng::seed_from_u64(16);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(HostSampler.sample(10, 1, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 10);
    }
}
