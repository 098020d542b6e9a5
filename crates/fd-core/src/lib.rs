//! fd-bench core engine.
//!
//! Replays heartbeat arrival traces through competing failure-detector
//! estimators and scores their accuracy, responsiveness, and resource cost:
//!
//! - [`window`]: bounded circular arrival store with incremental sum and
//!   consecutive-difference tracking
//! - [`estimator`]: the Accrual, Chen, and Bertier prediction formulas and
//!   their shared mistake accounting
//! - [`sweep`]: one-pass evaluation of an array-valued configuration axis
//! - [`dsl`]: compiler turning textual update rules into estimator
//!   equivalents
//! - [`driver`]: sequential fold of one trace through one estimator
//! - [`runner`]: worker-pool fan-out over independent evaluation units
//! - [`probe`], [`trace_io`], [`scenarios`]: resource sampling, trace
//!   loading, and synthetic traces

pub mod driver;
pub mod dsl;
pub mod estimator;
pub mod probe;
pub mod runner;
pub mod scenarios;
pub mod sweep;
pub mod trace_io;
pub mod window;

pub use driver::{evaluate, evaluate_spec};
pub use estimator::{build, Accrual, Bertier, Chen, Estimator, PredictionState};
pub use probe::{NullProbe, ResourceProbe, SelfProbe};
pub use runner::{run_units, EvalUnit};
pub use sweep::mistake_sweep;
pub use window::ArrivalWindow;

pub use fd_common::{ArrivalTrace, Error, EvalReport, ResourceSample, Result};
pub use fd_config::DetectorSpec;
