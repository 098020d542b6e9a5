//! One-pass parameter-sweep evaluation.
//!
//! A sweep runs one estimator formula against an array of candidate values
//! for exactly one configuration axis, scanning the trace once. When the
//! axis is the window capacity each candidate keeps its own window (the
//! state genuinely differs); for any other axis a single window is shared
//! and the formula is broadcast element-wise over the candidates.
//!
//! The sweep's sole output is the cumulative mistake duration per
//! candidate; the other per-trace metrics are defined only for the
//! single-configuration driver.

use fd_common::{ArrivalTrace, Error, Result};
use fd_config::{BertierConfig, DetectorSpec, SweepAxis};

use crate::estimator::accrual::expected_interval;
use crate::estimator::{Accrual, Bertier, Chen, Estimator};
use crate::window::ArrivalWindow;

/// A parameter that is either shared by all candidates or varies per
/// candidate along the sweep axis.
#[derive(Debug, Clone)]
enum AxisValue {
    Scalar(f64),
    Array(Vec<f64>),
}

impl AxisValue {
    fn at(&self, index: usize) -> f64 {
        match self {
            AxisValue::Scalar(v) => *v,
            AxisValue::Array(values) => values[index],
        }
    }
}

/// Evaluates the sweep described by `spec` and returns one cumulative
/// mistake duration per candidate value.
///
/// The spec must carry exactly one array-typed parameter; all-scalar specs
/// belong to the single-configuration driver and rule programs never sweep.
pub fn mistake_sweep(trace: &ArrivalTrace, spec: &DetectorSpec) -> Result<Vec<f64>> {
    if matches!(spec, DetectorSpec::Rule(_)) {
        return Err(Error::Config(
            "rule programs cannot be swept; run them with the single-configuration driver".into(),
        ));
    }
    let axis = spec.sweep_axis()?.ok_or_else(|| {
        Error::Config(format!(
            "detector `{}` has no array-typed parameter to sweep",
            spec.name()
        ))
    })?;

    match (spec, axis) {
        (DetectorSpec::Accrual(cfg), SweepAxis::Window(caps)) => {
            let phi = cfg.phi.scalar("phi")?;
            let base_interval = cfg.base_interval;
            capacity_sweep(trace, &caps, || {
                Box::new(Accrual::new(base_interval, phi))
            })
        }
        (DetectorSpec::Accrual(cfg), SweepAxis::Named { values, .. }) => {
            accrual_phi_sweep(trace, cfg.window.capacity("window")?, cfg.base_interval, &values)
        }
        (DetectorSpec::Chen(cfg), SweepAxis::Window(caps)) => {
            let bias = cfg.bias.scalar("bias")?;
            let base_interval = cfg.base_interval;
            capacity_sweep(trace, &caps, || Box::new(Chen::new(base_interval, bias)))
        }
        (DetectorSpec::Chen(cfg), SweepAxis::Named { values, .. }) => {
            chen_bias_sweep(trace, cfg.window.capacity("window")?, cfg.base_interval, &values)
        }
        (DetectorSpec::Bertier(cfg), SweepAxis::Window(caps)) => {
            let est = scalar_bertier(cfg)?;
            capacity_sweep(trace, &caps, || Box::new(est.clone()))
        }
        (DetectorSpec::Bertier(cfg), SweepAxis::Named { param, values }) => {
            bertier_axis_sweep(trace, cfg, &param, values)
        }
        (DetectorSpec::Rule(_), _) => unreachable!("rejected above"),
    }
}

fn scalar_bertier(cfg: &BertierConfig) -> Result<Bertier> {
    Ok(Bertier::new(
        cfg.base_interval,
        cfg.gamma.scalar("gamma")?,
        cfg.beta.scalar("beta")?,
        cfg.phi.scalar("phi")?,
        cfg.delay.scalar("delay")?,
        cfg.var.scalar("var")?,
    ))
}

/// Window-capacity sweep: one independent window and estimator instance per
/// candidate capacity, single scan of the trace.
fn capacity_sweep(
    trace: &ArrivalTrace,
    capacities: &[usize],
    make: impl Fn() -> Box<dyn Estimator>,
) -> Result<Vec<f64>> {
    let first = trace.first().ok_or(Error::EmptyTrace)?;

    struct Lane {
        window: ArrivalWindow,
        estimator: Box<dyn Estimator>,
        expected: f64,
        mistake: f64,
    }

    let mut lanes = capacities
        .iter()
        .map(|&capacity| {
            let estimator = make();
            Ok(Lane {
                window: ArrivalWindow::new(capacity)?,
                expected: estimator.initial_prediction(first),
                estimator,
                mistake: 0.0,
            })
        })
        .collect::<Result<Vec<Lane>>>()?;

    for &arrival in trace.as_slice() {
        for lane in &mut lanes {
            lane.window.append(arrival);
            lane.mistake += (arrival - lane.expected).max(0.0);
            lane.expected = lane
                .estimator
                .next_expected(arrival, lane.expected, &lane.window)?;
        }
    }

    Ok(lanes.into_iter().map(|lane| lane.mistake).collect())
}

/// φ-axis Accrual sweep: the interval fit is computed once per arrival, the
/// quantile once per candidate.
fn accrual_phi_sweep(
    trace: &ArrivalTrace,
    capacity: usize,
    base_interval: f64,
    phis: &[f64],
) -> Result<Vec<f64>> {
    let first = trace.first().ok_or(Error::EmptyTrace)?;
    let mut window = ArrivalWindow::new(capacity)?;
    let mut expected = vec![first; phis.len()];
    let mut mistakes = vec![0.0; phis.len()];

    for &arrival in trace.as_slice() {
        window.append(arrival);
        for (mistake, &exp) in mistakes.iter_mut().zip(expected.iter()) {
            *mistake += (arrival - exp).max(0.0);
        }
        let differences = window.differences();
        for (exp, &phi) in expected.iter_mut().zip(phis.iter()) {
            *exp = arrival + expected_interval(&differences, base_interval, phi)?;
        }
    }
    Ok(mistakes)
}

/// α-axis Chen sweep: the shared mean term is computed once per arrival.
fn chen_bias_sweep(
    trace: &ArrivalTrace,
    capacity: usize,
    base_interval: f64,
    biases: &[f64],
) -> Result<Vec<f64>> {
    let mut window = ArrivalWindow::new(capacity)?;
    let mut expected = vec![f64::INFINITY; biases.len()];
    let mut mistakes = vec![0.0; biases.len()];

    for &arrival in trace.as_slice() {
        window.append(arrival);
        for (mistake, &exp) in mistakes.iter_mut().zip(expected.iter()) {
            *mistake += (arrival - exp).max(0.0);
        }
        // Grouped exactly as the scalar estimator computes it, so sweep and
        // scalar runs agree bit for bit.
        let len = window.len() as f64;
        let mean_term = window.sum() / len;
        let interval_term = ((len + 1.0) / 2.0) * base_interval;
        for (exp, &bias) in expected.iter_mut().zip(biases.iter()) {
            *exp = bias + mean_term + interval_term;
        }
    }
    Ok(mistakes)
}

/// Bertier sweep over any non-window axis: the smoothing recurrence runs
/// element-wise with the non-swept parameters broadcast as scalars.
fn bertier_axis_sweep(
    trace: &ArrivalTrace,
    cfg: &BertierConfig,
    param: &str,
    values: Vec<f64>,
) -> Result<Vec<f64>> {
    let first = trace.first().ok_or(Error::EmptyTrace)?;
    let count = values.len();

    let pick = |name: &str, scalar: Result<f64>| -> Result<AxisValue> {
        if name == param {
            Ok(AxisValue::Array(values.clone()))
        } else {
            Ok(AxisValue::Scalar(scalar?))
        }
    };
    let gamma = pick("gamma", cfg.gamma.scalar("gamma"))?;
    let beta = pick("beta", cfg.beta.scalar("beta"))?;
    let phi = pick("phi", cfg.phi.scalar("phi"))?;
    let mut delay: Vec<f64> = match pick("delay", cfg.delay.scalar("delay"))? {
        AxisValue::Scalar(v) => vec![v; count],
        AxisValue::Array(v) => v,
    };
    let mut var: Vec<f64> = match pick("var", cfg.var.scalar("var"))? {
        AxisValue::Scalar(v) => vec![v; count],
        AxisValue::Array(v) => v,
    };

    let mut window = ArrivalWindow::new(cfg.window.capacity("window")?)?;
    let mut expected = vec![first; count];
    let mut mistakes = vec![0.0; count];

    for &arrival in trace.as_slice() {
        window.append(arrival);
        let len = window.len() as f64;
        let mean_term = window.sum() / len;
        let interval_term = ((len + 1.0) / 2.0) * cfg.base_interval;

        for j in 0..count {
            mistakes[j] += (arrival - expected[j]).max(0.0);

            let error = arrival - expected[j] - delay[j];
            delay[j] += gamma.at(j) * error;
            var[j] += gamma.at(j) * (error.abs() - var[j]);
            let bias = beta.at(j) * delay[j] + phi.at(j) * var[j];
            expected[j] = bias + mean_term + interval_term;
        }
    }
    Ok(mistakes)
}
