//! Optimized allocation and collection types for Umbra.
//!
//! This module provides:
//! - Re-exports of optimized hash collections using AHash
//! - A fixed-seed hasher for content signatures that must be stable
//! - [`HandleSet`], generational storage for environment entities

pub mod handle_set;

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use handle_set::{Handle, HandleSet};

const SIGNATURE_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Hasher state with fixed seeds, so equal input always hashes to the same
/// value across instances and runs.
pub fn stable_state() -> RandomState {
    let [k0, k1, k2, k3] = SIGNATURE_SEEDS;
    RandomState::with_seeds(k0, k1, k2, k3)
}
