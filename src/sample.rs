//! Reproducible bounded sampling of catalog rows.
//!
//! Algorithm: shuffle-and-slice. The index range `0..len` is shuffled with a
//! Fisher-Yates shuffle (`SliceRandom::shuffle`) driven by `StdRng` seeded via
//! `seed_from_u64(seed)`, then truncated to `cap`. Sampled rows keep their
//! shuffled order. With the same rand major version, seed, and input length the
//! selection is identical across runs.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Default working-catalog size cap.
pub const DEFAULT_CAP: usize = 20_000;

/// Default sampling seed.
pub const DEFAULT_SEED: u64 = 42;

/// Pick which source rows make up the working set.
///
/// `len <= cap` keeps every row in input order; otherwise exactly `cap` distinct
/// indices are drawn. Position in the returned vector is the new dense row index.
pub fn sample_indices(len: usize, cap: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    if len <= cap {
        return indices;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices.truncate(cap);
    log::debug!("Sampled {} of {} rows (seed {})", cap, len, seed);
    indices
}

/// Gather `items` at `indices`, renumbering densely from 0.
pub fn take_rows<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_under_cap_keeps_order() {
        assert_eq!(sample_indices(5, 10, 42), vec![0, 1, 2, 3, 4]);
        assert_eq!(sample_indices(10, 10, 42), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_over_cap_exact_size_distinct() {
        let picked = sample_indices(1000, 100, 42);
        assert_eq!(picked.len(), 100);
        let unique: HashSet<usize> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 100);
        assert!(picked.iter().all(|&i| i < 1000));
    }

    #[test]
    fn test_same_seed_same_sample() {
        assert_eq!(sample_indices(5000, 300, 42), sample_indices(5000, 300, 42));
    }

    #[test]
    fn test_different_seed_different_sample() {
        assert_ne!(sample_indices(5000, 300, 42), sample_indices(5000, 300, 7));
    }

    #[test]
    fn test_take_rows_preserves_correspondence() {
        let names = vec!["a", "b", "c", "d"];
        let values = vec![10, 20, 30, 40];
        let idx = vec![3, 0, 2];
        assert_eq!(take_rows(&names, &idx), vec!["d", "a", "c"]);
        assert_eq!(take_rows(&values, &idx), vec![40, 10, 30]);
    }
}
