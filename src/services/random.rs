// src/services/random.rs

//! Random draw helpers shared by the season generator and the winner picker.

use rand::Rng;

/// Source of uniform random numbers.
///
/// Every `rand` generator is a source; tests can script exact sequences.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    ///
    /// Scaled from [`next_unit`](Self::next_unit), so only exact while
    /// `bound` fits the 53-bit mantissa.
    fn next_below(&mut self, bound: u128) -> u128 {
        debug_assert!(bound > 0);
        ((self.next_unit() * bound as f64).floor() as u128).min(bound - 1)
    }
}

impl<R: Rng> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    fn next_below(&mut self, bound: u128) -> u128 {
        self.gen_range(0..bound)
    }
}

/// Uniform index in `0..len`. `len` must be non-zero.
pub fn pick_index<R: RandomSource + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0);
    let index = (rng.next_unit() * len as f64).floor() as usize;
    index.min(len - 1)
}

/// Fisher–Yates shuffle in place.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = pick_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// Round to the nearest multiple of `step`.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Replays a fixed list of draws, cycling when exhausted.
#[cfg(test)]
pub(crate) struct Scripted {
    values: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn pick_index_covers_range() {
        let mut rng = Scripted::new(&[0.0, 0.5, 0.999, 1.0]);
        assert_eq!(pick_index(&mut rng, 4), 0);
        assert_eq!(pick_index(&mut rng, 4), 2);
        assert_eq!(pick_index(&mut rng, 4), 3);
        // A source returning exactly 1.0 must stay in bounds.
        assert_eq!(pick_index(&mut rng, 4), 3);
    }

    #[test]
    fn shuffle_keeps_elements() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_with_zero_draws_rotates_first() {
        // j = 0 on every step: [a, b, c] -> swap(2, 0) -> [c, b, a] -> swap(1, 0) -> [b, c, a]
        let mut rng = Scripted::new(&[0.0]);
        let mut items = vec!['a', 'b', 'c'];
        shuffle(&mut items, &mut rng);
        assert_eq!(items, vec!['b', 'c', 'a']);
    }

    #[test]
    fn next_below_stays_in_range() {
        let mut scripted = Scripted::new(&[0.0, 0.3, 1.0]);
        assert_eq!(scripted.next_below(100), 0);
        assert_eq!(scripted.next_below(100), 30);
        assert_eq!(scripted.next_below(100), 99);

        let mut rng = StdRng::seed_from_u64(11);
        let bound = u128::from(u64::MAX) * 4 + 3;
        for _ in 0..1_000 {
            assert!(rng.next_below(bound) < bound);
        }
    }

    #[test]
    fn rounds_to_nearest_step() {
        assert_eq!(round_to_step(94.0, 10.0), 90.0);
        assert_eq!(round_to_step(95.0, 10.0), 100.0);
        assert_eq!(round_to_step(7.0, 5.0), 5.0);
        assert_eq!(round_to_step(8.0, 5.0), 10.0);
    }
}
