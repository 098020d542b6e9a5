//! Validated heartbeat arrival traces.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered sequence of heartbeat arrival timestamps.
///
/// Timestamps are unit-agnostic but must be consistent with the configured
/// base interval. The sequence is validated to be finite and monotonic
/// non-decreasing at construction; evaluation code may therefore rely on
/// ordering without re-checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ArrivalTrace {
    samples: Vec<f64>,
}

impl ArrivalTrace {
    /// Builds a trace from raw samples, rejecting non-finite or out-of-order
    /// timestamps.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self> {
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(Error::Trace(format!(
                    "timestamps out of order at index {}: {} after {}",
                    i + 1,
                    pair[1],
                    pair[0]
                )));
            }
        }
        if let Some(bad) = samples.iter().find(|v| !v.is_finite()) {
            return Err(Error::Trace(format!("non-finite timestamp {bad}")));
        }
        Ok(Self { samples })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.samples.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }
}

impl TryFrom<Vec<f64>> for ArrivalTrace {
    type Error = Error;

    fn try_from(samples: Vec<f64>) -> Result<Self> {
        Self::from_samples(samples)
    }
}

impl From<ArrivalTrace> for Vec<f64> {
    fn from(trace: ArrivalTrace) -> Self {
        trace.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_monotonic_samples() {
        let trace = ArrivalTrace::from_samples(vec![1.0, 1.0, 2.5, 9.0]).unwrap();
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.first(), Some(1.0));
        assert_eq!(trace.last(), Some(9.0));
    }

    #[test]
    fn rejects_out_of_order_samples() {
        let err = ArrivalTrace::from_samples(vec![1.0, 3.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::Trace(_)));
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn rejects_non_finite_samples() {
        let err = ArrivalTrace::from_samples(vec![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, Error::Trace(_)));
    }

    #[test]
    fn serde_round_trips_as_plain_array() {
        let trace = ArrivalTrace::from_samples(vec![5.0, 8.0, 10.0]).unwrap();
        let json = serde_json::to_string(&trace).unwrap();
        assert_eq!(json, "[5.0,8.0,10.0]");
        let back: ArrivalTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trace);
    }

    #[test]
    fn serde_rejects_out_of_order_input() {
        let parsed: std::result::Result<ArrivalTrace, _> = serde_json::from_str("[3.0,1.0]");
        assert!(parsed.is_err());
    }
}
