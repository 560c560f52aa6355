//! Earthquake feed model shared by the terminal viewer and benchmarks.
//!
//! Everything here is pure: no terminal, no global state. The binary in
//! `main.rs` owns the map surface and calls into these modules.

pub mod geo;
pub mod quake;
