//! Failure-detector benchmark common types and errors.
//!
//! This crate provides the foundational types shared across fd-bench crates:
//! - Validated arrival traces
//! - The evaluation result contract
//! - Common error types

pub mod error;
pub mod report;
pub mod trace;

pub use error::{Error, Result};
pub use report::{EvalReport, ResourceSample};
pub use trace::ArrivalTrace;
