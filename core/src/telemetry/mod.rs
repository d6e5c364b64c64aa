//! telemetry/mod.rs
//! Unified telemetry module: counters, timers, and immutable snapshots.
//!
//! Counters are owned per actor (receiver, frame worker) and merged once the
//! pipeline stops, so neither hot loop touches shared state.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
