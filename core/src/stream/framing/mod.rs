//! Marker-delimited frame assembly.
//!
//! Responsibilities:
//! - Accumulate received chunks in arrival order
//! - Cut complete frames between consecutive marker occurrences
//! - Report discarded bytes as typed anomalies
//!
//! Non-responsibilities:
//! - Field extraction
//! - IO
//! - Persistence

pub mod types;
pub mod assembler;

pub use types::{
    AssemblyPass,
    Frame,
    FramingAnomaly,
    RetainPolicy,
};
pub use assembler::FrameAssembler;
