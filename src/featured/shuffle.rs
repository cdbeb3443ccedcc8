//! Seeded shuffle
//!
//! A linear congruential generator and Fisher–Yates shuffle. The same seed
//! always yields the same permutation, on any machine and in any process.

use chrono::{Datelike, NaiveDate};

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

/// Seed for one calendar day: `20240501` for 2024-05-01.
pub fn daily_seed(date: NaiveDate) -> u32 {
    let year = date.year().max(0) as u32;
    year * 10_000 + date.month() * 100 + date.day()
}

/// `state = state * 1664525 + 1013904223 (mod 2^32)`
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Uniform-ish index in `0..bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        (self.next_u32() as usize) % bound
    }
}

/// Shuffles `items` in place, walking from the last index down.
pub fn seeded_shuffle<T>(items: &mut [T], seed: u32) {
    let mut rng = Lcg::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
