//! Per-detector configuration structs.
//!
//! Each config names its parameters the way the underlying algorithm does.
//! The `base_interval` is always a plain scalar: it is the external constant
//! the whole benchmark shares, never a sweep axis.

use fd_common::Result;
use serde::{Deserialize, Serialize};

use crate::params::ParamValue;
use crate::resolve::{single_sweep_axis, SweepAxis};

/// Accrual (Phi) failure detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualConfig {
    /// Window capacity `n`.
    pub window: ParamValue,
    /// Suspicion threshold φ; the prediction targets probability 1 − 0.1^φ.
    pub phi: ParamValue,
    /// Base heartbeat interval Δ, used until two arrivals are available.
    pub base_interval: f64,
}

impl AccrualConfig {
    pub fn sweep_axis(&self) -> Result<Option<SweepAxis>> {
        single_sweep_axis(&[("window", &self.window), ("phi", &self.phi)])
    }
}

/// Chen failure detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChenConfig {
    /// Window capacity `n`.
    pub window: ParamValue,
    /// Safety margin α added to the averaged arrival estimate.
    pub bias: ParamValue,
    /// Base heartbeat interval Δ.
    pub base_interval: f64,
}

impl ChenConfig {
    pub fn sweep_axis(&self) -> Result<Option<SweepAxis>> {
        single_sweep_axis(&[("window", &self.window), ("bias", &self.bias)])
    }
}

/// Bertier jitter-adaptive failure detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BertierConfig {
    /// Window capacity `n`.
    pub window: ParamValue,
    /// Smoothing gain γ applied to the prediction error.
    pub gamma: ParamValue,
    /// Weight β of the smoothed delay in the safety margin.
    #[serde(default = "default_beta")]
    pub beta: ParamValue,
    /// Weight φ of the smoothed error magnitude in the safety margin.
    #[serde(default = "default_phi")]
    pub phi: ParamValue,
    /// Initial smoothed delay.
    #[serde(default = "default_zero")]
    pub delay: ParamValue,
    /// Initial smoothed error magnitude.
    #[serde(default = "default_zero")]
    pub var: ParamValue,
    /// Base heartbeat interval Δ.
    pub base_interval: f64,
}

fn default_beta() -> ParamValue {
    ParamValue::Float(1.0)
}

fn default_phi() -> ParamValue {
    ParamValue::Float(4.0)
}

fn default_zero() -> ParamValue {
    ParamValue::Float(0.0)
}

impl BertierConfig {
    pub fn sweep_axis(&self) -> Result<Option<SweepAxis>> {
        single_sweep_axis(&[
            ("window", &self.window),
            ("gamma", &self.gamma),
            ("beta", &self.beta),
            ("phi", &self.phi),
            ("delay", &self.delay),
            ("var", &self.var),
        ])
    }
}

/// A compiled-rule detector: the program text plus the base-interval
/// constant handed to it as its only external scalar input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule program source (`Outside`/`Inside`/`EA` sections).
    pub program: String,
    /// Base heartbeat interval Δ, exposed to the program as `delta`.
    pub base_interval: f64,
}

/// A detector selection with its configuration, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detector", rename_all = "snake_case")]
pub enum DetectorSpec {
    Accrual(AccrualConfig),
    Chen(ChenConfig),
    Bertier(BertierConfig),
    Rule(RuleConfig),
}

impl DetectorSpec {
    /// Resolved sweep axis; rule programs never sweep.
    pub fn sweep_axis(&self) -> Result<Option<SweepAxis>> {
        match self {
            DetectorSpec::Accrual(cfg) => cfg.sweep_axis(),
            DetectorSpec::Chen(cfg) => cfg.sweep_axis(),
            DetectorSpec::Bertier(cfg) => cfg.sweep_axis(),
            DetectorSpec::Rule(_) => Ok(None),
        }
    }

    /// Short algorithm name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            DetectorSpec::Accrual(_) => "accrual",
            DetectorSpec::Chen(_) => "chen",
            DetectorSpec::Bertier(_) => "bertier",
            DetectorSpec::Rule(_) => "rule",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_common::Error;

    #[test]
    fn accrual_config_parses_from_tagged_json() {
        let json = r#"{"detector":"accrual","window":1000,"phi":1.0,"base_interval":1e8}"#;
        let spec: DetectorSpec = serde_json::from_str(json).unwrap();
        let DetectorSpec::Accrual(cfg) = &spec else {
            panic!("wrong variant");
        };
        assert_eq!(cfg.window, ParamValue::Int(1000));
        assert_eq!(cfg.base_interval, 1e8);
        assert_eq!(spec.name(), "accrual");
    }

    #[test]
    fn bertier_defaults_match_reference_parameters() {
        let json = r#"{"detector":"bertier","window":100,"gamma":0.1,"base_interval":1.0}"#;
        let DetectorSpec::Bertier(cfg) = serde_json::from_str(json).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(cfg.beta, ParamValue::Float(1.0));
        assert_eq!(cfg.phi, ParamValue::Float(4.0));
        assert_eq!(cfg.delay, ParamValue::Float(0.0));
        assert_eq!(cfg.var, ParamValue::Float(0.0));
    }

    #[test]
    fn sweep_axis_conflict_names_both_parameters() {
        let spec = DetectorSpec::Chen(ChenConfig {
            window: vec![1.0, 2.0].into(),
            bias: vec![0.0, 1.0].into(),
            base_interval: 1.0,
        });
        let err = spec.sweep_axis().unwrap_err();
        let Error::ArrayAxisConflict { first, second } = err else {
            panic!("expected conflict");
        };
        assert_eq!((first.as_str(), second.as_str()), ("window", "bias"));
    }

    #[test]
    fn rule_spec_never_sweeps() {
        let spec = DetectorSpec::Rule(RuleConfig {
            program: "Outside:N=5&delta&1;EA:A+object->interval".into(),
            base_interval: 1.0,
        });
        assert_eq!(spec.sweep_axis().unwrap(), None);
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = DetectorSpec::Bertier(BertierConfig {
            window: 50i64.into(),
            gamma: 0.1.into(),
            beta: 1.0.into(),
            phi: 4.0.into(),
            delay: 0.0.into(),
            var: 0.0.into(),
            base_interval: 2.0,
        });
        let json = serde_json::to_string(&spec).unwrap();
        let back: DetectorSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
