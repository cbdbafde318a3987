//! Endpoint selection strategies for the free-text pool.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks which endpoint of the pool serves the next attempt.
pub trait EndpointSelector: Send + Sync {
    /// Index into a pool of `pool_len` (> 0) endpoints. `previous` is the endpoint
    /// that failed on the last attempt, if any.
    fn select(&self, pool_len: usize, previous: Option<usize>) -> usize;
}

/// Uniformly random selection that avoids repeating the endpoint that just failed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl EndpointSelector for RandomSelector {
    fn select(&self, pool_len: usize, previous: Option<usize>) -> usize {
        let mut rng = rand::thread_rng();
        match previous {
            Some(prev) if pool_len > 1 && prev < pool_len => {
                // Draw from the other endpoints, then shift past the failed one.
                let pick = rng.gen_range(0..pool_len - 1);
                if pick >= prev {
                    pick + 1
                } else {
                    pick
                }
            }
            _ => rng.gen_range(0..pool_len.max(1)),
        }
    }
}

/// Replays a fixed sequence of indices, wrapping around. Deterministic, for tests and
/// for pinning a single endpoint.
#[derive(Debug)]
pub struct SequenceSelector {
    sequence: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceSelector {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of selections made so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl EndpointSelector for SequenceSelector {
    fn select(&self, pool_len: usize, _previous: Option<usize>) -> usize {
        let n = self.cursor.fetch_add(1, Ordering::SeqCst);
        if self.sequence.is_empty() {
            return n % pool_len.max(1);
        }
        self.sequence[n % self.sequence.len()] % pool_len.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_rotates_away_from_failure() {
        let selector = RandomSelector;
        for _ in 0..200 {
            let idx = selector.select(3, Some(1));
            assert!(idx < 3);
            assert_ne!(idx, 1);
        }
    }

    #[test]
    fn test_random_single_endpoint() {
        assert_eq!(RandomSelector.select(1, Some(0)), 0);
        assert_eq!(RandomSelector.select(1, None), 0);
    }

    #[test]
    fn test_sequence_wraps() {
        let selector = SequenceSelector::new(vec![2, 0, 5]);
        let picks: Vec<usize> = (0..4).map(|_| selector.select(3, None)).collect();
        assert_eq!(picks, vec![2, 0, 2, 2]);
        assert_eq!(selector.calls(), 4);
    }
}
