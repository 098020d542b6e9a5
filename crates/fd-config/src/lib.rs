//! fd-bench configuration loading and validation.
//!
//! This crate provides:
//! - Typed parameter values (scalar integer, scalar float, array)
//! - Per-detector configuration structs and the tagged `DetectorSpec`
//! - Single-sweep-axis resolution, performed once before any simulation

pub mod detector;
pub mod params;
pub mod resolve;

pub use detector::{AccrualConfig, BertierConfig, ChenConfig, DetectorSpec, RuleConfig};
pub use params::ParamValue;
pub use resolve::{single_sweep_axis, SweepAxis};
