//! Typed detector parameter values.

use fd_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// A detector parameter: exactly one of scalar integer, scalar float, or
/// array of floats.
///
/// Any other JSON representation (strings, objects, nested arrays) fails
/// deserialization, so malformed configurations are rejected before any
/// simulation work starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Array(Vec<f64>),
}

impl ParamValue {
    /// Scalar view of the value; `None` for arrays.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            ParamValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ParamValue::Array(_))
    }

    /// Scalar value of a parameter that must not be array-typed in the
    /// current evaluation plan.
    pub fn scalar(&self, name: &str) -> Result<f64> {
        self.as_scalar().ok_or_else(|| {
            Error::Config(format!(
                "parameter `{name}` must be scalar in this evaluation"
            ))
        })
    }

    /// Window-capacity view: a scalar positive integer.
    pub fn capacity(&self, name: &str) -> Result<usize> {
        match self {
            ParamValue::Int(v) if *v >= 1 => Ok(*v as usize),
            ParamValue::Array(_) => Err(Error::Config(format!(
                "parameter `{name}` must be scalar in this evaluation"
            ))),
            other => Err(Error::InvalidCapacity {
                value: format!("{other:?}"),
            }),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Array(v)
    }
}
