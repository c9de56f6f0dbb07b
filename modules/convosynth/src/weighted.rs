//! Random selection primitives.
//!
//! Weighted draws use one cumulative-sum pass: draw `r` uniformly in
//! `[0, total)` and take the first candidate whose running sum exceeds `r`.
//! Keeping the method fixed keeps seeded runs reproducible.

use rand::Rng;

/// Index of a weighted draw, or `None` when there are no candidates or every
/// weight is zero.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[u32]) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return None;
    }

    let threshold = rng.random::<f64>() * total as f64;
    let mut running = 0u64;
    for (i, &w) in weights.iter().enumerate() {
        running += u64::from(w);
        if (running as f64) > threshold {
            return Some(i);
        }
    }
    // Float rounding can leave `threshold` at `total`; fall to the last
    // candidate with non-zero weight.
    weights.iter().rposition(|&w| w > 0)
}

/// Weighted draw over `(item, weight)` pairs.
pub fn choose_weighted<'a, T, R: Rng + ?Sized>(rng: &mut R, candidates: &'a [(T, u32)]) -> Option<&'a T> {
    let weights: Vec<u32> = candidates.iter().map(|(_, w)| *w).collect();
    weighted_index(rng, &weights).map(|i| &candidates[i].0)
}

/// Uniform draw.
pub fn choose<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[rng.random_range(0..items.len())])
}
