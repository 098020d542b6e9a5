//! Accrual (Phi) failure detector.

use fd_common::{Error, Result};
use fd_math::{mean_and_std, normal_quantile};

use crate::window::ArrivalWindow;

use super::Estimator;

/// Expected inter-arrival interval under the Accrual rule.
///
/// With no recorded differences the base interval stands in; with a single
/// difference that difference is the estimate. From two differences on, the
/// interval is the Normal quantile at cumulative probability `1 − 0.1^φ`
/// with the differences' mean and population standard deviation. The 0- and
/// 1-difference guards are what keep the fit away from degenerate
/// single-sample statistics; a zero-variance fit is still reported as an
/// arithmetic error.
///
/// This function is shared verbatim by the built-in estimator, the φ-axis
/// sweep, and the rule-program `object->interval` accessor, so all three
/// agree bit for bit.
pub fn expected_interval(differences: &[f64], base_interval: f64, phi: f64) -> Result<f64> {
    match differences.len() {
        0 => Ok(base_interval),
        1 => Ok(differences[0]),
        _ => {
            let (mean, std) = mean_and_std(differences).unwrap_or((0.0, 0.0));
            let p = 1.0 - 0.1_f64.powf(phi);
            normal_quantile(p, mean, std).ok_or_else(|| {
                Error::Arithmetic(format!(
                    "degenerate interval fit (mean {mean}, std {std}, phi {phi})"
                ))
            })
        }
    }
}

/// Accrual estimator: prediction = arrival + expected interval.
#[derive(Debug, Clone)]
pub struct Accrual {
    base_interval: f64,
    phi: f64,
}

impl Accrual {
    pub fn new(base_interval: f64, phi: f64) -> Self {
        Self { base_interval, phi }
    }
}

impl Estimator for Accrual {
    fn initial_prediction(&self, first_arrival: f64) -> f64 {
        first_arrival
    }

    fn next_expected(
        &mut self,
        arrival: f64,
        _previous: f64,
        window: &ArrivalWindow,
    ) -> Result<f64> {
        let interval = expected_interval(&window.differences(), self.base_interval, self.phi)?;
        Ok(arrival + interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(values: &[f64], capacity: usize) -> ArrivalWindow {
        let mut window = ArrivalWindow::new(capacity).unwrap();
        for &v in values {
            window.append(v);
        }
        window
    }

    #[test]
    fn single_arrival_falls_back_to_base_interval() {
        let mut est = Accrual::new(7.5, 1.0);
        let window = window_with(&[5.0], 5);
        let next = est.next_expected(5.0, 5.0, &window).unwrap();
        assert_eq!(next, 12.5);
    }

    #[test]
    fn two_arrivals_use_the_single_difference() {
        let mut est = Accrual::new(7.5, 1.0);
        let window = window_with(&[5.0, 8.0], 5);
        let next = est.next_expected(8.0, 12.5, &window).unwrap();
        assert_eq!(next, 11.0);
    }

    #[test]
    fn quantile_fit_matches_the_closed_form_oracle() {
        // [5, 8, 10, 15, 21] leaves differences [3, 2, 5, 6]: mean 4,
        // population std sqrt(2.5). At phi = 1 the target probability is
        // 0.9 and the fitted interval is 6.0263109430377515.
        let window = window_with(&[5.0, 8.0, 10.0, 15.0, 21.0], 5);
        let interval = expected_interval(&window.differences(), 100.0, 1.0).unwrap();
        assert!((interval - 6.0263109430377515).abs() < 1e-9);

        let mut est = Accrual::new(100.0, 1.0);
        let next = est.next_expected(21.0, 0.0, &window).unwrap();
        assert!((next - 27.02631094303775).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_fit_is_an_arithmetic_error() {
        // Perfectly regular arrivals: every difference is 10.
        let window = window_with(&[0.0, 10.0, 20.0, 30.0], 5);
        let err = expected_interval(&window.differences(), 1.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::Arithmetic(_)));
    }

    #[test]
    fn non_positive_phi_is_an_arithmetic_error() {
        let window = window_with(&[0.0, 3.0, 7.0], 5);
        let err = expected_interval(&window.differences(), 1.0, 0.0).unwrap_err();
        assert!(matches!(err, Error::Arithmetic(_)));
    }
}
