//! Umbra Core
//!
//! This crate contains the shared building blocks for the Umbra lighting engine:
//! logging bootstrap, profiling hooks, math types and optimized collections.

pub mod alloc;
pub mod logging;
pub mod math;
pub mod profiling;
