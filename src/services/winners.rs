// src/services/winners.rs

//! Weighted winner selection without replacement.
//!
//! Entries are shuffled once, then each draw takes an integer `r` uniformly
//! in `[0, remaining)` and picks the first entry whose running point sum
//! exceeds `r`. The winner leaves the pool before the next draw, so every
//! draw is proportional to each remaining entry's share of the remaining
//! points. Once only zero-point entries remain they are taken in shuffled
//! order.

use crate::models::LotteryEntry;
use crate::services::random::{RandomSource, shuffle};

/// Draws up to `target` distinct winners.
#[derive(Debug, Clone, Copy)]
pub struct WinnerPicker {
    target: usize,
}

impl WinnerPicker {
    pub fn new(target: usize) -> Self {
        Self { target }
    }

    /// Winners in draw order.
    ///
    /// Returns nothing when there are no entries or no points at all.
    pub fn pick<R: RandomSource + ?Sized>(
        &self,
        entries: Vec<LotteryEntry>,
        rng: &mut R,
    ) -> Vec<LotteryEntry> {
        if entries.is_empty() || total_weight(&entries) == 0 || self.target == 0 {
            return Vec::new();
        }

        let mut pool = entries;
        shuffle(&mut pool, rng);

        let goal = self.target.min(pool.len());
        let mut winners = Vec::with_capacity(goal);
        while winners.len() < goal {
            let remaining = total_weight(&pool);
            let index = if remaining > 0 {
                draw_index(&pool, rng.next_below(remaining))
            } else {
                0
            };
            winners.push(pool.remove(index));
        }
        winners
    }
}

/// Sum of weights; `u128` holds any number of `u64` weights this side of
/// 2^64 entries.
fn total_weight(entries: &[LotteryEntry]) -> u128 {
    entries.iter().map(|e| u128::from(e.weight())).sum()
}

/// First entry whose running sum exceeds `r`; `r` is below the pool total.
fn draw_index(pool: &[LotteryEntry], r: u128) -> usize {
    let mut running = 0u128;
    for (index, entry) in pool.iter().enumerate() {
        running += u128::from(entry.weight());
        if running > r {
            return index;
        }
    }
    pool.len() - 1
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::services::random::Scripted;

    fn entries(points: &[i64]) -> Vec<LotteryEntry> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| LotteryEntry::new(format!("player{i}"), "7", *p))
            .collect()
    }

    #[test]
    fn returns_min_of_target_and_entries_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(1);

        for (points, target, expected) in [
            (vec![5, 10, 1, 30, 2], 3, 3),
            (vec![5, 10, 1], 8, 3),
            (vec![0, 0, 4, 0], 8, 4),
            (vec![100], 1, 1),
        ] {
            let winners = WinnerPicker::new(target).pick(entries(&points), &mut rng);
            let names: HashSet<_> = winners.iter().map(|w| w.user_name.clone()).collect();

            assert_eq!(winners.len(), expected);
            assert_eq!(names.len(), expected);
        }
    }

    #[test]
    fn zero_points_return_nothing() {
        let mut rng = Scripted::new(&[0.5]);
        for target in [0, 1, 8, 100] {
            assert!(WinnerPicker::new(target).pick(entries(&[0, 0, 0]), &mut rng).is_empty());
        }
        assert!(WinnerPicker::new(8).pick(Vec::new(), &mut rng).is_empty());
    }

    #[test]
    fn negative_points_count_as_zero() {
        let mut rng = Scripted::new(&[0.5]);
        assert!(WinnerPicker::new(3).pick(entries(&[-5, 0]), &mut rng).is_empty());

        let winners = WinnerPicker::new(1).pick(entries(&[-50, 10]), &mut StdRng::seed_from_u64(3));
        assert_eq!(winners[0].user_name, "player1");
    }

    #[test]
    fn heavier_entry_wins_nine_times_as_often() {
        let mut rng = StdRng::seed_from_u64(2024);
        let picker = WinnerPicker::new(1);
        let trials = 20_000;

        let mut heavy = 0;
        for _ in 0..trials {
            let winners = picker.pick(entries(&[10, 90]), &mut rng);
            if winners[0].user_name == "player1" {
                heavy += 1;
            }
        }

        let share = heavy as f64 / trials as f64;
        assert!((0.87..0.93).contains(&share), "heavy share was {share}");
    }

    #[test]
    fn scripted_draw_follows_running_sums() {
        // shuffle draws (j = 0 twice) turn [a, b, c] into [b, c, a]
        // weights [20, 30, 50]: r = floor(0.3 * 100) = 30 -> running 20, 50 -> c
        // remaining [b, a] = [20, 50]: r = floor(0.1 * 70) = 7 -> b
        let pool = vec![
            LotteryEntry::new("a", "1", 50),
            LotteryEntry::new("b", "1", 20),
            LotteryEntry::new("c", "1", 30),
        ];
        let mut rng = Scripted::new(&[0.0, 0.0, 0.3, 0.1]);

        let winners = WinnerPicker::new(2).pick(pool, &mut rng);
        let names: Vec<_> = winners.iter().map(|w| w.user_name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn huge_point_totals_do_not_overflow() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool = entries(&[i64::MAX, i64::MAX, i64::MAX, 1]);

        let winners = WinnerPicker::new(8).pick(pool, &mut rng);
        let names: HashSet<_> = winners.iter().map(|w| w.user_name.clone()).collect();
        assert_eq!(winners.len(), 4);
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn zero_point_entries_fill_after_weighted_ones() {
        let mut rng = StdRng::seed_from_u64(9);
        let winners = WinnerPicker::new(3).pick(entries(&[0, 25, 0]), &mut rng);

        assert_eq!(winners.len(), 3);
        assert_eq!(winners[0].user_name, "player1");
    }
}
