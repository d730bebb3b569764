//! Test fixtures for rowsweep development.
//!
//! Initializers and transforms shared by the integration tests and
//! benchmarks. The engine-facing fixtures live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rowsweep_core::Initializer;
use rowsweep_grid::Grid;

pub use fixtures::{CountingTransform, PanicOnThread, StallOnThread};

/// Row 0 set explicitly, every other cell `fill`.
#[derive(Clone, Debug)]
pub struct FirstRowInit {
    pub first: Vec<f64>,
    pub fill: f64,
}

impl FirstRowInit {
    pub fn new(first: Vec<f64>, fill: f64) -> Self {
        Self { first, fill }
    }
}

impl Initializer for FirstRowInit {
    fn value(&self, row: usize, col: usize) -> f64 {
        if row == 0 {
            self.first.get(col).copied().unwrap_or(self.fill)
        } else {
            self.fill
        }
    }
}

/// Deterministic pseudo-random values in `[-1, 1)`, derived from the
/// cell position and `seed` only.
#[derive(Clone, Copy, Debug)]
pub struct HashInit {
    pub seed: u64,
}

impl Initializer for HashInit {
    fn value(&self, row: usize, col: usize) -> f64 {
        // splitmix64 finalizer
        let mut z = self
            .seed
            .wrapping_add((row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .wrapping_add((col as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

/// Build a grid from literal rows. Panics on ragged input.
pub fn grid_from_rows(rows: &[&[f64]]) -> Grid {
    let cols = rows.first().map_or(0, |r| r.len());
    let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Grid::from_vec(rows.len(), cols, data).unwrap()
}
