//! Performance benchmarks for lit-msm
//!
//! Criterion benches live in `benches/`; this crate only holds the machine
//! they share.

pub mod fixtures;
