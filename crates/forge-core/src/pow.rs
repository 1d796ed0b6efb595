use crate::{
    constants::{POW_BATCH_SIZE, POW_DIFFICULTY},
    error::{LedgerError, Result},
    hasher::{sha256, Hash},
};
use rayon::prelude::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::debug;

/// Shared flag a caller flips to stop a running proof search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStrategy {
    #[default]
    Sequential,
    /// Each batch is split across the rayon pool; the lowest hit still wins.
    Parallel,
}

/// The puzzle: find `proof` such that `sha256("{last_proof}{proof}")`, in hex,
/// starts with `difficulty` zeros.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
    strategy: SearchStrategy,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(POW_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            strategy: SearchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn is_valid(&self, last_proof: u64, candidate: u64) -> bool {
        let guess = format!("{last_proof}{candidate}");
        leading_zero_nibbles(&sha256(guess.as_bytes())) >= self.difficulty
    }

    /// Smallest non-negative `proof` valid against `last_proof`.
    ///
    /// Candidates are tried in batches of [`POW_BATCH_SIZE`]; `cancel` is
    /// checked before each batch and turns into [`LedgerError::Cancelled`].
    pub fn solve(&self, last_proof: u64, cancel: &CancelToken) -> Result<u64> {
        let mut start = 0u64;
        loop {
            if cancel.is_cancelled() {
                debug!(last_proof, tried = start, "proof search cancelled");
                return Err(LedgerError::Cancelled);
            }
            let end = start.saturating_add(POW_BATCH_SIZE);
            let found = match self.strategy {
                SearchStrategy::Sequential => {
                    (start..end).find(|candidate| self.is_valid(last_proof, *candidate))
                }
                SearchStrategy::Parallel => (start..end)
                    .into_par_iter()
                    .find_first(|candidate| self.is_valid(last_proof, *candidate)),
            };
            if let Some(proof) = found {
                debug!(last_proof, proof, difficulty = self.difficulty, "proof found");
                return Ok(proof);
            }
            if end == u64::MAX {
                return Err(LedgerError::ProofSpaceExhausted);
            }
            start = end;
        }
    }
}

/// Number of leading zero hex digits in `hash`.
pub fn leading_zero_nibbles(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 2;
        } else {
            if *b >> 4 == 0 {
                total += 1;
            }
            break;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};

    #[test]
    fn leading_zero_nibble_examples() {
        let mut h = [0u8; 32];
        assert_eq!(leading_zero_nibbles(&h), 64);
        h[0] = 0x0F;
        assert_eq!(leading_zero_nibbles(&h), 1);
        h[0] = 0x10;
        assert_eq!(leading_zero_nibbles(&h), 0);
        h = [0u8; 32];
        h[1] = 0x80;
        assert_eq!(leading_zero_nibbles(&h), 2);
        h[1] = 0x01;
        assert_eq!(leading_zero_nibbles(&h), 3);
    }

    #[test]
    fn nibble_count_matches_hex_prefix() {
        for i in 0u32..500 {
            let h = sha256(i.to_string().as_bytes());
            let hex = hex::encode(h);
            let zeros = hex.chars().take_while(|c| *c == '0').count() as u32;
            assert_eq!(leading_zero_nibbles(&h), zeros);
        }
    }

    #[test]
    fn is_valid_example() {
        let pow = ProofOfWork::default();
        assert!(pow.is_valid(100, 35293));
        assert!(!pow.is_valid(100, 35292));
        assert!(!pow.is_valid(100, 35294));
        assert!(pow.is_valid(35293, 35089));
    }

    #[test]
    fn solve_returns_smallest_valid_proof() {
        let pow = ProofOfWork::default();
        let proof = pow.solve(100, &CancelToken::new()).unwrap();
        assert_eq!(proof, 35293);
        assert!(pow.is_valid(100, proof));
        assert!((0..proof).all(|candidate| !pow.is_valid(100, candidate)));
    }

    #[test]
    fn solve_chains_from_previous_proof() {
        let pow = ProofOfWork::default();
        let cancel = CancelToken::new();
        let first = pow.solve(100, &cancel).unwrap();
        let second = pow.solve(first, &cancel).unwrap();
        assert_eq!(second, 35089);
        assert!(pow.is_valid(first, second));
    }

    #[test]
    fn difficulty_is_configurable() {
        let cancel = CancelToken::new();
        assert_eq!(ProofOfWork::new(0).solve(100, &cancel).unwrap(), 0);
        assert_eq!(ProofOfWork::new(2).solve(100, &cancel).unwrap(), 226);
        assert_eq!(ProofOfWork::new(3).solve(100, &cancel).unwrap(), 6016);
    }

    #[test]
    fn parallel_search_agrees_with_sequential() {
        let cancel = CancelToken::new();
        for difficulty in 1..=4 {
            let seq = ProofOfWork::new(difficulty);
            let par = seq.with_strategy(SearchStrategy::Parallel);
            for last_proof in [0u64, 1, 100, 35293] {
                assert_eq!(
                    seq.solve(last_proof, &cancel).unwrap(),
                    par.solve(last_proof, &cancel).unwrap(),
                    "difficulty {difficulty}, last_proof {last_proof}"
                );
            }
        }
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(
            ProofOfWork::default().solve(100, &cancel),
            Err(LedgerError::Cancelled)
        );
    }

    #[test]
    fn cancel_stops_running_search() {
        // 64 zero digits is never met, so only cancellation can end the search.
        let pow = ProofOfWork::new(64);
        let cancel = CancelToken::new();
        let handle = {
            let cancel = cancel.clone();
            thread::spawn(move || pow.solve(100, &cancel))
        };
        thread::sleep(Duration::from_millis(50));
        cancel.cancel();
        assert_eq!(handle.join().unwrap(), Err(LedgerError::Cancelled));
    }
}
