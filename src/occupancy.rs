//! Where spot availability comes from.
//!
//! Layout and styling only see `OccupancySource`, so the configured counts or
//! the random simulation can be swapped for sensor data later.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_PROBABILITY: f64 = 0.5;

pub trait OccupancySource {
    /// One flag per spot of a row with `count` spots, `available` of them
    /// free according to the lot table. Flags are in row order.
    fn availability(&mut self, lot: &str, count: u32, available: u32) -> Vec<bool>;
}

impl<S: OccupancySource + ?Sized> OccupancySource for Box<S> {
    fn availability(&mut self, lot: &str, count: u32, available: u32) -> Vec<bool> {
        (**self).availability(lot, count, available)
    }
}

/// First `available` spots of every row are free, the rest taken
pub struct ConfiguredOccupancy;

impl OccupancySource for ConfiguredOccupancy {
    fn availability(&mut self, _lot: &str, count: u32, available: u32) -> Vec<bool> {
        (0..count).map(|i| i < available).collect()
    }
}

/// Each spot free with probability `probability`, independently.
/// Seeded so a given seed always produces the same lot.
pub struct SimulatedOccupancy {
    rng: ChaCha8Rng,
    probability: f64,
}

impl SimulatedOccupancy {
    pub fn new(seed: u64, probability: f64) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            DEFAULT_PROBABILITY
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            probability,
        }
    }
}

impl OccupancySource for SimulatedOccupancy {
    fn availability(&mut self, _lot: &str, count: u32, _available: u32) -> Vec<bool> {
        (0..count)
            .map(|_| self.rng.gen_bool(self.probability))
            .collect()
    }
}
