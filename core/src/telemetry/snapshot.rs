// ## src/telemetry/snapshot.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// Core telemetry snapshot.
/// Captures counters, rates, stage timings, and elapsed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    pub frames_per_sec: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let secs = elapsed.as_secs_f64();

        let (frames_per_sec, throughput) = if secs > 0.0 {
            (
                counters.frames_emitted as f64 / secs,
                counters.bytes_received as f64 / secs,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            counters: counters.clone(),
            frames_per_sec,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn frames(&self) -> u64 {
        self.counters.frames_emitted
    }

    /// Internal invariants:
    /// - framed + discarded bytes never exceed received bytes
    /// - every record is accounted for by exactly one sink outcome
    /// - no single stage outlasts the run (receive and worker stages overlap,
    ///   so only per-stage totals are comparable with `elapsed`)
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        let outcomes = c.records_delivered() + c.records_skipped + c.sink_failures;

        c.bytes_framed + c.bytes_discarded <= c.bytes_received
            && outcomes == c.frames_emitted
            && self.stage_times.iter().all(|(_, d)| *d <= self.elapsed)
    }
}
