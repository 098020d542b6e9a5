//! Sweep-axis resolution.
//!
//! The scalar-vs-array decision is made here exactly once, before any
//! simulation work, and carried forward as a tagged value. Evaluation code
//! never re-inspects parameter shapes.

use fd_common::{Error, Result};

use crate::params::ParamValue;

/// The single configuration axis allowed to vary as an array within one
/// evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepAxis {
    /// The window capacity varies; every candidate needs its own window.
    Window(Vec<usize>),
    /// Any other named parameter varies; the window is shared and the
    /// formula is broadcast over the candidate values.
    Named { param: String, values: Vec<f64> },
}

impl SweepAxis {
    /// Number of candidate values along the axis.
    pub fn len(&self) -> usize {
        match self {
            SweepAxis::Window(caps) => caps.len(),
            SweepAxis::Named { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves the array-typed axis of a parameter set.
///
/// `params` pairs each parameter name with its value; the name `"window"`
/// designates the window-capacity parameter. Returns `Ok(None)` when every
/// parameter is scalar, the resolved axis when exactly one is array-typed,
/// and a configuration error when two or more are.
pub fn single_sweep_axis(params: &[(&str, &ParamValue)]) -> Result<Option<SweepAxis>> {
    let mut arrays = params.iter().filter(|(_, value)| value.is_array());

    let Some(&(name, value)) = arrays.next() else {
        return Ok(None);
    };
    if let Some(&(second, _)) = arrays.next() {
        return Err(Error::ArrayAxisConflict {
            first: name.to_string(),
            second: second.to_string(),
        });
    }

    let values = value.as_array().unwrap_or_default().to_vec();
    if values.is_empty() {
        return Err(Error::Config(format!(
            "sweep axis `{name}` must not be empty"
        )));
    }

    if name == "window" {
        let caps = values
            .iter()
            .map(|&v| {
                if v.is_finite() && v >= 1.0 && v.fract() == 0.0 {
                    Ok(v as usize)
                } else {
                    Err(Error::InvalidCapacity {
                        value: v.to_string(),
                    })
                }
            })
            .collect::<Result<Vec<usize>>>()?;
        return Ok(Some(SweepAxis::Window(caps)));
    }

    Ok(Some(SweepAxis::Named {
        param: (*name).to_string(),
        values,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scalar_resolves_to_none() {
        let window = ParamValue::Int(100);
        let phi = ParamValue::Float(1.0);
        let axis = single_sweep_axis(&[("window", &window), ("phi", &phi)]).unwrap();
        assert_eq!(axis, None);
    }

    #[test]
    fn window_array_resolves_to_capacities() {
        let window = ParamValue::Array(vec![1.0, 2.0, 3.0]);
        let phi = ParamValue::Float(1.0);
        let axis = single_sweep_axis(&[("window", &window), ("phi", &phi)])
            .unwrap()
            .unwrap();
        assert_eq!(axis, SweepAxis::Window(vec![1, 2, 3]));
        assert_eq!(axis.len(), 3);
    }

    #[test]
    fn named_axis_keeps_parameter_name() {
        let window = ParamValue::Int(4);
        let phi = ParamValue::Array(vec![0.5, 1.0]);
        let axis = single_sweep_axis(&[("window", &window), ("phi", &phi)])
            .unwrap()
            .unwrap();
        assert_eq!(
            axis,
            SweepAxis::Named {
                param: "phi".into(),
                values: vec![0.5, 1.0]
            }
        );
    }

    #[test]
    fn two_arrays_conflict() {
        let window = ParamValue::Array(vec![1.0]);
        let phi = ParamValue::Array(vec![1.0]);
        let err = single_sweep_axis(&[("window", &window), ("phi", &phi)]).unwrap_err();
        assert!(matches!(err, Error::ArrayAxisConflict { .. }));
    }

    #[test]
    fn fractional_window_candidate_is_rejected() {
        let window = ParamValue::Array(vec![1.0, 2.5]);
        let err = single_sweep_axis(&[("window", &window)]).unwrap_err();
        assert!(matches!(err, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn empty_axis_is_rejected() {
        let phi = ParamValue::Array(vec![]);
        let err = single_sweep_axis(&[("phi", &phi)]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
