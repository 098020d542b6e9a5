//! Chen failure detector.

use fd_common::Result;

use crate::window::ArrivalWindow;

use super::Estimator;

/// Chen estimator: prediction = α + mean(window) + ((len + 1) / 2) · Δ.
///
/// Uses only the window's running sum and length; carries no state of its
/// own between arrivals. The initial prediction is +infinity, so the stream
/// cannot be scored before the first estimate exists.
#[derive(Debug, Clone)]
pub struct Chen {
    base_interval: f64,
    bias: f64,
}

impl Chen {
    pub fn new(base_interval: f64, bias: f64) -> Self {
        Self {
            base_interval,
            bias,
        }
    }
}

impl Estimator for Chen {
    fn initial_prediction(&self, _first_arrival: f64) -> f64 {
        f64::INFINITY
    }

    fn next_expected(
        &mut self,
        _arrival: f64,
        _previous: f64,
        window: &ArrivalWindow,
    ) -> Result<f64> {
        let len = window.len() as f64;
        Ok(self.bias + window.sum() / len + ((len + 1.0) / 2.0) * self.base_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_closed_form_exactly() {
        // Window [10, 20, 30], bias 0, Δ = 1: 0 + 20 + 2·1 = 22.
        let mut window = ArrivalWindow::new(3).unwrap();
        for v in [10.0, 20.0, 30.0] {
            window.append(v);
        }
        let mut est = Chen::new(1.0, 0.0);
        let next = est.next_expected(30.0, 0.0, &window).unwrap();
        assert_eq!(next, 22.0);
    }

    #[test]
    fn partial_window_uses_current_occupancy() {
        let mut window = ArrivalWindow::new(10).unwrap();
        window.append(6.0);
        window.append(10.0);
        let mut est = Chen::new(4.0, 1.5);
        // 1.5 + 16/2 + (3/2)·4 = 15.5
        let next = est.next_expected(10.0, 0.0, &window).unwrap();
        assert_eq!(next, 15.5);
    }

    #[test]
    fn initial_prediction_is_unreachable() {
        let est = Chen::new(1.0, 0.0);
        assert_eq!(est.initial_prediction(123.0), f64::INFINITY);
    }
}
