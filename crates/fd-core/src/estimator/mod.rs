//! Heartbeat arrival estimators and their shared accounting.
//!
//! Each estimator maps the current window state and the previous prediction
//! to the next expected arrival time. Mistake accounting and the end-of-trace
//! metrics are shared across all estimators (built-in or compiled) and live
//! in [`PredictionState`].

pub mod accrual;
pub mod bertier;
pub mod chen;

use fd_common::{Error, Result};
use fd_config::DetectorSpec;

use crate::dsl::RuleProgram;
use crate::window::ArrivalWindow;

pub use accrual::Accrual;
pub use bertier::Bertier;
pub use chen::Chen;

/// A heartbeat arrival estimator.
///
/// `next_expected` runs once per arrival, after the window has absorbed it.
/// Stateful estimators carry their smoothing state in `self`.
pub trait Estimator {
    /// Prediction in effect before the first arrival is scored.
    fn initial_prediction(&self, first_arrival: f64) -> f64;

    /// Next expected arrival given the just-ingested `arrival`, the
    /// prediction that was in effect for it, and the updated window.
    fn next_expected(
        &mut self,
        arrival: f64,
        previous: f64,
        window: &ArrivalWindow,
    ) -> Result<f64>;
}

/// Per-evaluation prediction bookkeeping: the current expected arrival,
/// cumulative mistake duration, and wrong-prediction count.
#[derive(Debug, Clone)]
pub struct PredictionState {
    expected: f64,
    mistake_duration: f64,
    wrong_count: u64,
}

impl PredictionState {
    pub fn new(initial_expected: f64) -> Self {
        Self {
            expected: initial_expected,
            mistake_duration: 0.0,
            wrong_count: 0,
        }
    }

    /// Prediction currently in effect.
    pub fn expected(&self) -> f64 {
        self.expected
    }

    pub fn mistake_duration(&self) -> f64 {
        self.mistake_duration
    }

    pub fn wrong_count(&self) -> u64 {
        self.wrong_count
    }

    /// Scores one arrival against the prediction in effect. The first
    /// arrival never counts as a mistake: its prediction is either the
    /// arrival itself or +infinity.
    pub fn observe(&mut self, arrival: f64) {
        if arrival > self.expected {
            self.mistake_duration += arrival - self.expected;
            self.wrong_count += 1;
        }
    }

    pub fn set_expected(&mut self, expected: f64) {
        self.expected = expected;
    }

    /// End-of-trace metrics: (mistake_duration, detection_time, pa).
    /// Detection time is clamped to zero.
    pub fn finish(&self, last_arrival: f64, stream_length: usize) -> (f64, f64, f64) {
        let detection_time = (self.expected - last_arrival).max(0.0);
        let pa = (stream_length as f64 - self.wrong_count as f64) / stream_length as f64;
        (self.mistake_duration, detection_time, pa)
    }
}

/// Builds the window capacity and estimator for an all-scalar detector
/// spec. Array-typed parameters are a configuration error here; they belong
/// to the sweep evaluator.
pub fn build(spec: &DetectorSpec) -> Result<(usize, Box<dyn Estimator>)> {
    if spec.sweep_axis()?.is_some() {
        return Err(Error::Config(format!(
            "detector `{}` has an array-typed parameter; use the sweep evaluator",
            spec.name()
        )));
    }
    match spec {
        DetectorSpec::Accrual(cfg) => {
            let capacity = cfg.window.capacity("window")?;
            let est = Accrual::new(cfg.base_interval, cfg.phi.scalar("phi")?);
            Ok((capacity, Box::new(est)))
        }
        DetectorSpec::Chen(cfg) => {
            let capacity = cfg.window.capacity("window")?;
            let est = Chen::new(cfg.base_interval, cfg.bias.scalar("bias")?);
            Ok((capacity, Box::new(est)))
        }
        DetectorSpec::Bertier(cfg) => {
            let capacity = cfg.window.capacity("window")?;
            let est = Bertier::new(
                cfg.base_interval,
                cfg.gamma.scalar("gamma")?,
                cfg.beta.scalar("beta")?,
                cfg.phi.scalar("phi")?,
                cfg.delay.scalar("delay")?,
                cfg.var.scalar("var")?,
            );
            Ok((capacity, Box::new(est)))
        }
        DetectorSpec::Rule(cfg) => {
            let program = RuleProgram::compile(&cfg.program)?;
            let (capacity, est) = program.instantiate(cfg.base_interval)?;
            Ok((capacity, Box::new(est)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_config::{AccrualConfig, ChenConfig};

    #[test]
    fn first_arrival_is_never_a_mistake() {
        let mut state = PredictionState::new(10.0);
        state.observe(10.0);
        assert_eq!(state.mistake_duration(), 0.0);
        assert_eq!(state.wrong_count(), 0);
    }

    #[test]
    fn late_arrivals_accumulate_mistakes() {
        let mut state = PredictionState::new(10.0);
        state.observe(13.0);
        state.set_expected(20.0);
        state.observe(26.5);
        assert_eq!(state.mistake_duration(), 3.0 + 6.5);
        assert_eq!(state.wrong_count(), 2);
    }

    #[test]
    fn finish_clamps_detection_time() {
        let mut state = PredictionState::new(f64::INFINITY);
        state.observe(5.0);
        state.set_expected(4.0);
        let (_, detection, pa) = state.finish(8.0, 1);
        assert_eq!(detection, 0.0);
        assert_eq!(pa, 1.0);
    }

    #[test]
    fn build_rejects_array_parameters() {
        let spec = DetectorSpec::Accrual(AccrualConfig {
            window: 5i64.into(),
            phi: vec![1.0, 2.0].into(),
            base_interval: 1.0,
        });
        assert!(matches!(build(&spec), Err(Error::Config(_))));
    }

    #[test]
    fn build_accepts_scalar_chen() {
        let spec = DetectorSpec::Chen(ChenConfig {
            window: 3i64.into(),
            bias: 0.0.into(),
            base_interval: 1.0,
        });
        let (capacity, _) = build(&spec).unwrap();
        assert_eq!(capacity, 3);
    }
}
