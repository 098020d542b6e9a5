//! Rule-program compiler for user-defined failure detectors.
//!
//! A rule program is UTF-8 text: statements separated by `;`, each a
//! `Label:content` pair, with comma-separated items inside the content and
//! whitespace entirely insignificant. Recognized labels, in fixed order:
//!
//! - `Outside`: one-time setup. Must contain the window-construction
//!   statement `N=<capacity>&<Δ>&<φ>` (a bare `N=<capacity>` is also
//!   accepted, but then `object->interval` is unavailable); the remaining
//!   items initialize rule variables.
//! - `Inside`: per-arrival assignments, evaluated after the engine's
//!   implicit append of the current arrival. The shared mistake accounting
//!   runs automatically after this section whether or not it is present.
//! - `EA`: exactly one formula producing the next expected arrival; must
//!   be the final section.
//!
//! Structural problems (unknown or duplicated labels, a missing `EA` or
//! window construction, references to names never assigned) are compile
//! errors; they never survive to execution. Compiled programs evaluate in
//! an isolated scope holding only the rule variables, the window, and the
//! base-interval constant.
//!
//! ```
//! use fd_core::dsl::RuleProgram;
//!
//! let program = RuleProgram::compile(
//!     "Outside: N=1000&delta&1;
//!      EA: A+object->interval",
//! )
//! .unwrap();
//! let (capacity, _estimator) = program.instantiate(1e8).unwrap();
//! assert_eq!(capacity, 1000);
//! ```

mod expr;
mod program;

use thiserror::Error;

pub use expr::{parse_expr, Accessor, BinOp, EvalCtx, Expr, ExprRefs, WindowCtx};
pub use program::{RuleEstimator, RuleProgram};

/// Compile-time diagnosis of a malformed rule program.
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("statement `{0}` is not a `Label:content` pair")]
    MalformedStatement(String),

    #[error("unrecognized section label `{0}`")]
    UnknownSection(String),

    #[error("duplicate section `{0}`")]
    DuplicateSection(&'static str),

    #[error("section `{0}` appears out of order (expected Outside, Inside, EA)")]
    SectionOutOfOrder(&'static str),

    #[error("missing required `EA` section")]
    MissingFormula,

    #[error("`EA` section must contain exactly one formula")]
    FormulaArity,

    #[error("missing window construction `N=...` in `Outside`")]
    MissingWindow,

    #[error("duplicate window construction in `Outside`")]
    DuplicateWindow,

    #[error("window construction expects 1 or 3 arguments, got {0}")]
    WindowArity(usize),

    #[error("item `{0}` is not a `name=expression` assignment")]
    MalformedAssignment(String),

    #[error("`{0}` cannot be assigned: the name is reserved")]
    ReservedName(String),

    #[error("placeholder `{0}` is only available inside the arrival loop")]
    PlaceholderOutsideLoop(char),

    #[error("window accessors are only available inside the arrival loop")]
    AccessorOutsideLoop,

    #[error("`object->interval` needs the 3-argument window construction")]
    IntervalWithoutParams,

    #[error("`{0}` referenced before assignment")]
    UndefinedName(String),

    #[error("unknown window accessor `object->{0}`")]
    UnknownAccessor(String),

    #[error("`{0}` does not support `->`; only `object` does")]
    ArrowAfterNonWindow(String),

    #[error("invalid numeric literal `{0}`")]
    InvalidNumber(String),

    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

impl From<RuleError> for fd_common::Error {
    fn from(err: RuleError) -> Self {
        fd_common::Error::Extension(err.to_string())
    }
}
