//! Parallel fan-out over independent evaluation units.
//!
//! Units are embarrassingly parallel: each receives an immutable trace and
//! detector spec and returns one self-contained result. Workers share
//! nothing mutable; results travel over an mpsc channel. A failed unit
//! yields an error result in its slot, never a dropped entry or a zero
//! score, and leaves its siblings untouched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use fd_common::{ArrivalTrace, Error, EvalReport, Result};
use fd_config::DetectorSpec;

use crate::driver::evaluate_spec;
use crate::probe::ResourceProbe;

/// One independent (trace, configuration) evaluation.
#[derive(Debug, Clone)]
pub struct EvalUnit {
    pub trace: Arc<ArrivalTrace>,
    pub spec: DetectorSpec,
}

/// Runs every unit to completion over a fixed pool of `workers` OS threads
/// and returns the results in submission order.
pub fn run_units(
    units: &[EvalUnit],
    workers: usize,
    probe: &dyn ResourceProbe,
) -> Vec<Result<EvalReport>> {
    if units.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, units.len());
    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Result<EvalReport>)>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            scope.spawn(move || loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(unit) = units.get(index) else {
                    break;
                };
                let result = evaluate_spec(&unit.trace, &unit.spec, probe);
                if let Err(err) = &result {
                    tracing::warn!(unit = index, error = %err, "evaluation unit failed");
                }
                if tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut results: Vec<Option<Result<EvalReport>>> =
            (0..units.len()).map(|_| None).collect();
        for (index, result) in rx {
            results[index] = Some(result);
        }
        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(Error::Config("evaluation unit vanished".into())))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::NullProbe;
    use fd_config::ChenConfig;

    fn unit(samples: &[f64], bias: f64) -> EvalUnit {
        EvalUnit {
            trace: Arc::new(ArrivalTrace::from_samples(samples.to_vec()).unwrap()),
            spec: DetectorSpec::Chen(ChenConfig {
                window: 3i64.into(),
                bias: bias.into(),
                base_interval: 1.0,
            }),
        }
    }

    #[test]
    fn results_arrive_in_submission_order() {
        let units: Vec<EvalUnit> = (0..8)
            .map(|i| unit(&[1.0, 2.0, 3.0, 4.0, 5.0], i as f64))
            .collect();
        let sequential: Vec<f64> = units
            .iter()
            .map(|u| {
                evaluate_spec(&u.trace, &u.spec, &NullProbe)
                    .unwrap()
                    .mistake_duration
            })
            .collect();
        let parallel = run_units(&units, 4, &NullProbe);
        for (result, expected) in parallel.iter().zip(sequential.iter()) {
            assert_eq!(result.as_ref().unwrap().mistake_duration, *expected);
        }
    }

    #[test]
    fn one_failing_unit_does_not_affect_siblings() {
        let bad = EvalUnit {
            trace: Arc::new(ArrivalTrace::from_samples(vec![]).unwrap()),
            spec: DetectorSpec::Chen(ChenConfig {
                window: 3i64.into(),
                bias: 0.0.into(),
                base_interval: 1.0,
            }),
        };
        let units = vec![unit(&[1.0, 2.0, 3.0], 0.0), bad, unit(&[1.0, 2.0, 3.0], 1.0)];
        let results = run_units(&units, 2, &NullProbe);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::EmptyTrace)));
        assert!(results[2].is_ok());
    }

    #[test]
    fn worker_count_larger_than_unit_count_is_fine() {
        let units = vec![unit(&[1.0, 2.0], 0.0)];
        let results = run_units(&units, 16, &NullProbe);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }
}
