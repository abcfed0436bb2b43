use crate::base62::{encode_padded, keyspace};
use crate::{check_length, Error, Generator, DEFAULT_CODE_LENGTH};
use pinhole_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Odd and not a multiple of 31, hence coprime with every `62^n`.
const MULTIPLIER: u128 = 1_000_000_007;
const INCREMENT: u128 = 0x2545_F491;

/// A counter based short code generator.
///
/// Each call takes the next value of a process-wide atomic counter and maps
/// it through an affine permutation of `[0, 62^length)`, so consecutive
/// codes do not look sequential while remaining collision free until the
/// counter wraps around the keyspace.
///
/// For multi-process deployments, give each process a disjoint offset
/// range (e.g., process 1 starts at 0, process 2 at 1_000_000_000).
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    length: usize,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            length: self.length,
        }
    }
}

impl SeqGenerator {
    /// Creates a generator producing codes of `length` characters.
    pub fn new(length: usize) -> Result<Self, Error> {
        Self::with_offset(length, 0)
    }

    /// Creates a generator whose counter starts at `offset`.
    ///
    /// Useful for resuming from a known state after a restart.
    pub fn with_offset(length: usize, offset: u64) -> Result<Self, Error> {
        Ok(Self {
            counter: AtomicU64::new(offset),
            length: check_length(length)?,
        })
    }

    /// Returns the value the next call to `generate` will consume.
    pub fn position(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    fn permute(&self, value: u64) -> u64 {
        let space = keyspace(self.length) as u128;
        let value = value as u128 % space;
        // result < space <= 62^8, which fits in u64
        ((value * MULTIPLIER + INCREMENT) % space) as u64
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self {
            counter: AtomicU64::new(0),
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self, _original_url: &str) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(encode_padded(self.permute(count), self.length))
    }
}
