//! Compilation and execution of rule programs.

use std::collections::{HashMap, HashSet};

use fd_common::{Error, Result};

use crate::estimator::Estimator;
use crate::window::ArrivalWindow;

use super::expr::{parse_expr, EvalCtx, Expr, WindowCtx};
use super::RuleError;

const SECTION_LABELS: [&str; 3] = ["Outside", "Inside", "EA"];

/// Names with fixed meaning that rule variables cannot shadow.
const RESERVED: [&str; 6] = ["A", "E", "delta", "object", "abs", "N"];

/// Window construction carried by the `N=...` statement: the capacity and,
/// in the 3-argument form, the Δ/φ parameters backing `object->interval`.
#[derive(Debug, Clone)]
struct WindowSpec {
    capacity: Expr,
    params: Option<(Expr, Expr)>,
}

/// One `Outside` item, in source order.
#[derive(Debug, Clone)]
enum SetupItem {
    Window(WindowSpec),
    Assign(String, Expr),
}

/// A compiled rule program, ready to be instantiated per evaluation.
#[derive(Debug, Clone)]
pub struct RuleProgram {
    setup: Vec<SetupItem>,
    per_arrival: Vec<(String, Expr)>,
    formula: Expr,
}

impl RuleProgram {
    /// Compiles program text, diagnosing structural problems before any
    /// execution can happen.
    pub fn compile(source: &str) -> std::result::Result<Self, RuleError> {
        // Whitespace (including newlines) is insignificant everywhere.
        let compact: String = source.chars().filter(|c| !c.is_whitespace()).collect();

        let mut setup = Vec::new();
        let mut per_arrival = Vec::new();
        let mut formula = None;
        let mut last_section = None::<usize>;
        let mut seen = [false; 3];

        for statement in compact.split(';').filter(|s| !s.is_empty()) {
            let Some((label, content)) = statement.split_once(':') else {
                return Err(RuleError::MalformedStatement(statement.to_string()));
            };
            let index = SECTION_LABELS
                .iter()
                .position(|&l| l == label)
                .ok_or_else(|| RuleError::UnknownSection(label.to_string()))?;
            if seen[index] {
                return Err(RuleError::DuplicateSection(SECTION_LABELS[index]));
            }
            if last_section.is_some_and(|last| index < last) {
                return Err(RuleError::SectionOutOfOrder(SECTION_LABELS[index]));
            }
            seen[index] = true;
            last_section = Some(index);

            match index {
                0 => setup = parse_setup(content)?,
                1 => per_arrival = parse_assignments(content)?,
                _ => {
                    if content.contains(',') {
                        return Err(RuleError::FormulaArity);
                    }
                    formula = Some(parse_expr(content)?);
                }
            }
        }

        let formula = formula.ok_or(RuleError::MissingFormula)?;
        let program = Self {
            setup,
            per_arrival,
            formula,
        };
        program.check_scopes()?;
        Ok(program)
    }

    /// Validates every name reference against the statements that precede
    /// it, and confines placeholders and window accessors to the loop.
    fn check_scopes(&self) -> std::result::Result<(), RuleError> {
        let mut defined: HashSet<&str> = HashSet::new();
        let mut window = None::<&WindowSpec>;

        for item in &self.setup {
            match item {
                SetupItem::Window(spec) => {
                    if window.is_some() {
                        return Err(RuleError::DuplicateWindow);
                    }
                    window = Some(spec);
                    check_setup_expr(&spec.capacity, &defined)?;
                    if let Some((delta, phi)) = &spec.params {
                        check_setup_expr(delta, &defined)?;
                        check_setup_expr(phi, &defined)?;
                    }
                }
                SetupItem::Assign(name, expr) => {
                    check_setup_expr(expr, &defined)?;
                    defined.insert(name);
                }
            }
        }

        let window = window.ok_or(RuleError::MissingWindow)?;
        let interval_available = window.params.is_some();

        for (name, expr) in &self.per_arrival {
            check_loop_expr(expr, &defined, interval_available)?;
            defined.insert(name);
        }
        check_loop_expr(&self.formula, &defined, interval_available)?;
        Ok(())
    }

    /// Evaluates the setup section and constructs the per-evaluation
    /// estimator together with its window capacity.
    pub fn instantiate(&self, base_interval: f64) -> Result<(usize, RuleEstimator)> {
        let mut vars = HashMap::new();
        let mut capacity = None;
        let mut window_params = None;

        for item in &self.setup {
            let ctx = EvalCtx {
                arrival: None,
                expected: None,
                base_interval,
                window: None,
                vars: &vars,
            };
            match item {
                SetupItem::Window(spec) => {
                    let value = spec.capacity.eval(&ctx)?;
                    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
                        return Err(Error::InvalidCapacity {
                            value: value.to_string(),
                        });
                    }
                    capacity = Some(value as usize);
                    if let Some((delta, phi)) = &spec.params {
                        window_params = Some((delta.eval(&ctx)?, phi.eval(&ctx)?));
                    }
                }
                SetupItem::Assign(name, expr) => {
                    let value = expr.eval(&ctx)?;
                    vars.insert(name.clone(), value);
                }
            }
        }

        let capacity = capacity
            .ok_or_else(|| Error::Extension(RuleError::MissingWindow.to_string()))?;
        Ok((
            capacity,
            RuleEstimator {
                vars,
                per_arrival: self.per_arrival.clone(),
                formula: self.formula.clone(),
                base_interval,
                window_params,
            },
        ))
    }
}

fn parse_setup(content: &str) -> std::result::Result<Vec<SetupItem>, RuleError> {
    let mut items = Vec::new();
    for item in content.split(',').filter(|s| !s.is_empty()) {
        let Some((name, rhs)) = item.split_once('=') else {
            return Err(RuleError::MalformedAssignment(item.to_string()));
        };
        if name == "N" {
            let args = rhs
                .split('&')
                .map(parse_expr)
                .collect::<std::result::Result<Vec<Expr>, RuleError>>()?;
            let spec = match args.len() {
                1 => WindowSpec {
                    capacity: args[0].clone(),
                    params: None,
                },
                3 => WindowSpec {
                    capacity: args[0].clone(),
                    params: Some((args[1].clone(), args[2].clone())),
                },
                n => return Err(RuleError::WindowArity(n)),
            };
            items.push(SetupItem::Window(spec));
        } else {
            check_assign_target(name)?;
            items.push(SetupItem::Assign(name.to_string(), parse_expr(rhs)?));
        }
    }
    Ok(items)
}

fn parse_assignments(content: &str) -> std::result::Result<Vec<(String, Expr)>, RuleError> {
    content
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|item| {
            let Some((name, rhs)) = item.split_once('=') else {
                return Err(RuleError::MalformedAssignment(item.to_string()));
            };
            check_assign_target(name)?;
            Ok((name.to_string(), parse_expr(rhs)?))
        })
        .collect()
}

fn check_assign_target(name: &str) -> std::result::Result<(), RuleError> {
    if RESERVED.contains(&name) {
        return Err(RuleError::ReservedName(name.to_string()));
    }
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RuleError::MalformedAssignment(name.to_string()));
    }
    Ok(())
}

fn check_setup_expr(
    expr: &Expr,
    defined: &HashSet<&str>,
) -> std::result::Result<(), RuleError> {
    let refs = expr.refs();
    if refs.uses_arrival {
        return Err(RuleError::PlaceholderOutsideLoop('A'));
    }
    if refs.uses_expected {
        return Err(RuleError::PlaceholderOutsideLoop('E'));
    }
    if refs.uses_window {
        return Err(RuleError::AccessorOutsideLoop);
    }
    for name in &refs.vars {
        if !defined.contains(name.as_str()) {
            return Err(RuleError::UndefinedName(name.clone()));
        }
    }
    Ok(())
}

fn check_loop_expr(
    expr: &Expr,
    defined: &HashSet<&str>,
    interval_available: bool,
) -> std::result::Result<(), RuleError> {
    let refs = expr.refs();
    if refs.uses_interval && !interval_available {
        return Err(RuleError::IntervalWithoutParams);
    }
    for name in &refs.vars {
        if !defined.contains(name.as_str()) {
            return Err(RuleError::UndefinedName(name.clone()));
        }
    }
    Ok(())
}

/// An instantiated rule program with the same external contract as a
/// built-in estimator. The variable scope lives here and nowhere else.
#[derive(Debug, Clone)]
pub struct RuleEstimator {
    vars: HashMap<String, f64>,
    per_arrival: Vec<(String, Expr)>,
    formula: Expr,
    base_interval: f64,
    window_params: Option<(f64, f64)>,
}

impl Estimator for RuleEstimator {
    fn initial_prediction(&self, first_arrival: f64) -> f64 {
        first_arrival
    }

    fn next_expected(
        &mut self,
        arrival: f64,
        previous: f64,
        window: &ArrivalWindow,
    ) -> Result<f64> {
        for (name, expr) in &self.per_arrival {
            let ctx = EvalCtx {
                arrival: Some(arrival),
                expected: Some(previous),
                base_interval: self.base_interval,
                window: Some(WindowCtx {
                    window,
                    params: self.window_params,
                }),
                vars: &self.vars,
            };
            let value = expr.eval(&ctx)?;
            self.vars.insert(name.clone(), value);
        }

        let ctx = EvalCtx {
            arrival: Some(arrival),
            expected: Some(previous),
            base_interval: self.base_interval,
            window: Some(WindowCtx {
                window,
                params: self.window_params,
            }),
            vars: &self.vars,
        };
        let next = self.formula.eval(&ctx)?;
        if next.is_nan() {
            return Err(Error::Arithmetic(format!(
                "rule formula produced NaN at arrival {arrival}"
            )));
        }
        Ok(next)
    }
}
