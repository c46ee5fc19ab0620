use alloc::string::String;
use rand::distr::Alphanumeric;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::Coord;

/// Length of a freshly generated round seed, roughly 142 bits of entropy.
pub const SEED_LEN: usize = 24;

/// Deterministic float stream keyed by an arbitrary seed string.
///
/// The seed is hashed with SHA-256 and the digest keys a ChaCha20 stream, so the same seed always yields the same
/// sequence and nothing outside the seed feeds into it.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: ChaCha20Rng,
}

impl SeededRng {
    pub fn new(seed: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self {
            inner: ChaCha20Rng::from_seed(digest),
        }
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// `floor(next * bound)`, always in `0..bound`.
    pub fn next_index(&mut self, bound: Coord) -> Coord {
        // truncation is floor for non-negative values
        let index = (self.next_f64() * f64::from(bound)) as Coord;
        index.min(bound.saturating_sub(1))
    }
}

/// Draws a fresh printable seed from `entropy`.
pub fn fresh_seed<R: RngCore>(entropy: &mut R) -> String {
    (0..SEED_LEN)
        .map(|_| char::from(entropy.sample(Alphanumeric)))
        .collect()
}
