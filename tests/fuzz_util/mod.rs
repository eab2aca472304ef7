#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded workload parameters, overridable through `OXIWINDOW_FUZZ_*`.
#[derive(Debug, Clone, Copy)]
pub struct FuzzParams {
    pub seed: u64,
    pub steps: usize,
    pub position_space: u64,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

pub fn params(test_tag: &str, default_steps: usize, default_positions: u64) -> FuzzParams {
    let base_seed = env_parse("OXIWINDOW_FUZZ_SEED").unwrap_or(0x5EED_0F_0A11_u64);
    // Fold the tag in so every test draws its own stream from one base seed.
    let seed = test_tag
        .bytes()
        .fold(base_seed, |seed, b| (seed ^ u64::from(b)).wrapping_mul(0x100_0000_01B3));

    FuzzParams {
        seed,
        steps: env_parse("OXIWINDOW_FUZZ_STEPS").unwrap_or(default_steps),
        position_space: env_parse("OXIWINDOW_FUZZ_POSITIONS")
            .unwrap_or(default_positions)
            .max(1),
    }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Pick a position, skewed so that a small hot range sees most traffic.
pub fn choose_position(rng: &mut StdRng, position_space: u64) -> u64 {
    let hot = (position_space / 10).max(1);
    if rng.gen_bool(0.8) {
        rng.gen_range(0..hot)
    } else {
        rng.gen_range(0..position_space)
    }
}

/// One step of a mixed point-read and scan workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read a position drawn from the skewed distribution
    Point(u64),
    /// Read the next position of the running scan
    Scan(u64),
    /// Close the pool, dropping every resident page
    Close,
}

/// Interleaves skewed point reads with a wrapping sequential scan.
pub struct MixedWorkload {
    rng: StdRng,
    position_space: u64,
    scan_cursor: u64,
}

impl MixedWorkload {
    pub fn new(params: FuzzParams) -> Self {
        Self {
            rng: rng(params.seed),
            position_space: params.position_space,
            scan_cursor: 0,
        }
    }

    pub fn next_access(&mut self) -> Access {
        match self.rng.gen_range(0u8..100) {
            0..=69 => Access::Point(choose_position(&mut self.rng, self.position_space)),
            70..=98 => {
                let position = self.scan_cursor;
                self.scan_cursor = (self.scan_cursor + 1) % self.position_space;
                Access::Scan(position)
            }
            _ => Access::Close,
        }
    }

    /// Pool capacity drawn from the workload's own stream.
    pub fn capacity(&mut self, max: usize) -> usize {
        self.rng.gen_range(1..=max)
    }
}
