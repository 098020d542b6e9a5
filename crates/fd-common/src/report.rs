//! Evaluation result contract.

use serde::{Deserialize, Serialize};

/// Resource-usage side measurements attached to an evaluation.
///
/// The engine treats these as opaque pass-through values supplied by the
/// caller's probe; they never influence correctness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// System CPU seconds consumed by the evaluating process.
    pub cpu_time_secs: f64,
    /// Resident set size in MiB.
    pub rss_mib: f64,
}

/// Result of evaluating one trace against one detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Cumulative amount by which actual arrivals exceeded their predicted
    /// time.
    pub mistake_duration: f64,
    /// Gap between the final prediction and the last observed arrival,
    /// clamped to zero.
    pub detection_time: f64,
    /// Fraction of arrivals whose actual time did not exceed the prior
    /// prediction, in [0, 1].
    pub pa: f64,
    /// Pass-through: CPU seconds reported by the resource probe.
    pub cpu_time_secs: f64,
    /// Pass-through: resident memory in MiB reported by the resource probe.
    pub rss_mib: f64,
}

impl EvalReport {
    /// Assembles a report from the accuracy metrics and a probe sample.
    pub fn new(mistake_duration: f64, detection_time: f64, pa: f64, usage: ResourceSample) -> Self {
        Self {
            mistake_duration,
            detection_time,
            pa,
            cpu_time_secs: usage.cpu_time_secs,
            rss_mib: usage.rss_mib,
        }
    }
}
