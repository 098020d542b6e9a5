//! Bertier jitter-adaptive failure detector.

use fd_common::Result;

use crate::window::ArrivalWindow;

use super::Estimator;

/// Bertier estimator: Chen's averaged estimate plus an adaptive safety
/// margin driven by the observed prediction error.
///
/// Per arrival: error = arrival − previous − delay, then
/// delay += γ·error, var += γ·(|error| − var), and the margin is
/// β·delay + φ·var. `delay` and `var` persist across arrivals as the
/// estimator's own smoothing state.
#[derive(Debug, Clone)]
pub struct Bertier {
    base_interval: f64,
    gamma: f64,
    beta: f64,
    phi: f64,
    delay: f64,
    var: f64,
}

impl Bertier {
    pub fn new(
        base_interval: f64,
        gamma: f64,
        beta: f64,
        phi: f64,
        initial_delay: f64,
        initial_var: f64,
    ) -> Self {
        Self {
            base_interval,
            gamma,
            beta,
            phi,
            delay: initial_delay,
            var: initial_var,
        }
    }

    /// Current smoothed delay estimate.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Current smoothed error-magnitude estimate.
    pub fn var(&self) -> f64 {
        self.var
    }
}

impl Estimator for Bertier {
    fn initial_prediction(&self, first_arrival: f64) -> f64 {
        first_arrival
    }

    fn next_expected(
        &mut self,
        arrival: f64,
        previous: f64,
        window: &ArrivalWindow,
    ) -> Result<f64> {
        let error = arrival - previous - self.delay;
        self.delay += self.gamma * error;
        self.var += self.gamma * (error.abs() - self.var);
        let bias = self.beta * self.delay + self.phi * self.var;

        let len = window.len() as f64;
        Ok(bias + window.sum() / len + ((len + 1.0) / 2.0) * self.base_interval)
    }
}
