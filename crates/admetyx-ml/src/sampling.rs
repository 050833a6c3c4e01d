//! Seeded sampling helpers shared by corpus generation and boosting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Deterministic generator for a given seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniform real in `[lo, hi)`. Returns `lo` for an empty range.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    rng.gen_range(lo..hi)
}

/// Uniform integer in `[lo, hi)`, returned as `f64` feature value.
pub fn uniform_int<R: Rng + ?Sized>(rng: &mut R, lo: u32, hi: u32) -> f64 {
    if hi <= lo {
        return lo as f64;
    }
    rng.gen_range(lo..hi) as f64
}

/// Normal deviate via the Box-Muller transform.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    // 1 - u keeps the log argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + sd * z
}

/// Bernoulli trial with probability `p`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Sample `count` distinct indices from `0..n`, returned in ascending order.
pub fn subsample_indices<R: Rng + ?Sized>(rng: &mut R, n: usize, count: usize) -> Vec<usize> {
    let count = count.min(n);
    if count == n {
        return (0..n).collect();
    }
    let mut picked = rand::seq::index::sample(rng, n, count).into_vec();
    picked.sort_unstable();
    picked
}

/// Fisher-Yates shuffle of `0..n`.
pub fn shuffled_indices<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices
}
