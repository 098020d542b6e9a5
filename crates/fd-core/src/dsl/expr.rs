//! Expression language of rule programs.
//!
//! A deliberately small arithmetic language: literals, `+ - * /`, unary
//! minus, parentheses, `abs(..)`, the placeholders `A` (current arrival),
//! `E` (current expected arrival) and `delta` (base-interval constant),
//! rule variables, and the window accessors `object->sum`, `object->len`,
//! `object->mean`, `object->latest`, `object->interval`. Each right-hand
//! side is parsed once into an AST and evaluated per arrival; no generated
//! code is ever executed.

use std::collections::HashMap;

use fd_common::{Error, Result};

use crate::estimator::accrual::expected_interval;
use crate::window::ArrivalWindow;

use super::RuleError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Arrow,
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, RuleError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.peek().copied() {
        match ch {
            '0'..='9' | '.' => {
                let mut text = String::new();
                while let Some(c) = chars.peek().copied() {
                    if c.is_ascii_digit() || c == '.' {
                        text.push(c);
                        chars.next();
                    } else if (c == 'e' || c == 'E') && !text.is_empty() {
                        // Exponent, optionally signed.
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        let mut exp = String::from(c);
                        if let Some(sign) = lookahead.peek().copied() {
                            if sign == '+' || sign == '-' {
                                exp.push(sign);
                                lookahead.next();
                            }
                        }
                        if lookahead.peek().is_some_and(|d| d.is_ascii_digit()) {
                            chars = lookahead;
                            while let Some(d) = chars.peek().copied() {
                                if d.is_ascii_digit() {
                                    exp.push(d);
                                    chars.next();
                                } else {
                                    break;
                                }
                            }
                            text.push_str(&exp);
                        }
                        break;
                    } else {
                        break;
                    }
                }
                let value: f64 = text
                    .parse()
                    .map_err(|_| RuleError::InvalidNumber(text.clone()))?;
                tokens.push(Token::Number(value));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut name = String::new();
                while let Some(c) = chars.peek().copied() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                if chars.peek() == Some(&'>') {
                    chars.next();
                    tokens.push(Token::Arrow);
                } else {
                    tokens.push(Token::Minus);
                }
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(RuleError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

/// Window-derived value named after the `object->` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Sum,
    Len,
    Mean,
    Latest,
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(String),
    Arrival,
    Expected,
    BaseInterval,
    Window(Accessor),
    Neg(Box<Expr>),
    Abs(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> std::result::Result<(), RuleError> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(RuleError::UnexpectedToken(format!("{t:?}"))),
            None => Err(RuleError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> std::result::Result<Expr, RuleError> {
        let mut lhs = self.term()?;
        while let Some(op) = match self.peek() {
            Some(Token::Plus) => Some(BinOp::Add),
            Some(Token::Minus) => Some(BinOp::Sub),
            _ => None,
        } {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> std::result::Result<Expr, RuleError> {
        let mut lhs = self.factor()?;
        while let Some(op) = match self.peek() {
            Some(Token::Star) => Some(BinOp::Mul),
            Some(Token::Slash) => Some(BinOp::Div),
            _ => None,
        } {
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> std::result::Result<Expr, RuleError> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.factor()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> std::result::Result<Expr, RuleError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "abs" => {
                    self.expect(Token::LParen)?;
                    let inner = self.expr()?;
                    self.expect(Token::RParen)?;
                    Ok(Expr::Abs(Box::new(inner)))
                }
                "A" => Ok(Expr::Arrival),
                "E" => Ok(Expr::Expected),
                "delta" => Ok(Expr::BaseInterval),
                "object" => {
                    self.expect(Token::Arrow)?;
                    let field = match self.next() {
                        Some(Token::Ident(field)) => field,
                        Some(t) => return Err(RuleError::UnexpectedToken(format!("{t:?}"))),
                        None => return Err(RuleError::UnexpectedEnd),
                    };
                    let accessor = match field.as_str() {
                        "sum" => Accessor::Sum,
                        "len" => Accessor::Len,
                        "mean" => Accessor::Mean,
                        "latest" => Accessor::Latest,
                        "interval" => Accessor::Interval,
                        other => return Err(RuleError::UnknownAccessor(other.to_string())),
                    };
                    Ok(Expr::Window(accessor))
                }
                _ => {
                    if self.peek() == Some(&Token::Arrow) {
                        return Err(RuleError::ArrowAfterNonWindow(name));
                    }
                    Ok(Expr::Var(name))
                }
            },
            Some(t) => Err(RuleError::UnexpectedToken(format!("{t:?}"))),
            None => Err(RuleError::UnexpectedEnd),
        }
    }
}

/// Parses one expression; trailing tokens are an error.
pub fn parse_expr(input: &str) -> std::result::Result<Expr, RuleError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(t) => Err(RuleError::UnexpectedToken(format!("{t:?}"))),
    }
}

/// Static references made by an expression, for compile-time scope checks.
#[derive(Debug, Default)]
pub struct ExprRefs {
    pub vars: Vec<String>,
    pub uses_arrival: bool,
    pub uses_expected: bool,
    pub uses_window: bool,
    pub uses_interval: bool,
}

impl Expr {
    pub fn refs(&self) -> ExprRefs {
        let mut refs = ExprRefs::default();
        self.collect_refs(&mut refs);
        refs
    }

    fn collect_refs(&self, refs: &mut ExprRefs) {
        match self {
            Expr::Number(_) | Expr::BaseInterval => {}
            Expr::Var(name) => refs.vars.push(name.clone()),
            Expr::Arrival => refs.uses_arrival = true,
            Expr::Expected => refs.uses_expected = true,
            Expr::Window(accessor) => {
                refs.uses_window = true;
                if *accessor == Accessor::Interval {
                    refs.uses_interval = true;
                }
            }
            Expr::Neg(inner) | Expr::Abs(inner) => inner.collect_refs(refs),
            Expr::Bin(_, lhs, rhs) => {
                lhs.collect_refs(refs);
                rhs.collect_refs(refs);
            }
        }
    }
}

/// Window view handed to expression evaluation: the live window plus the
/// Δ/φ parameters its construction statement carried (if any).
pub struct WindowCtx<'a> {
    pub window: &'a ArrivalWindow,
    pub params: Option<(f64, f64)>,
}

/// Evaluation scope: exactly the placeholders, the window capability, and
/// the rule variables. No ambient host state is reachable.
pub struct EvalCtx<'a> {
    pub arrival: Option<f64>,
    pub expected: Option<f64>,
    pub base_interval: f64,
    pub window: Option<WindowCtx<'a>>,
    pub vars: &'a HashMap<String, f64>,
}

impl Expr {
    pub fn eval(&self, ctx: &EvalCtx<'_>) -> Result<f64> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::BaseInterval => Ok(ctx.base_interval),
            Expr::Arrival => ctx
                .arrival
                .ok_or_else(|| Error::Extension("`A` is only available inside the loop".into())),
            Expr::Expected => ctx
                .expected
                .ok_or_else(|| Error::Extension("`E` is only available inside the loop".into())),
            Expr::Var(name) => ctx
                .vars
                .get(name)
                .copied()
                .ok_or_else(|| Error::Extension(format!("`{name}` referenced before assignment"))),
            Expr::Window(accessor) => {
                let win = ctx
                    .window
                    .as_ref()
                    .ok_or_else(|| Error::Extension("window is not available here".into()))?;
                match accessor {
                    Accessor::Sum => Ok(win.window.sum()),
                    Accessor::Len => Ok(win.window.len() as f64),
                    Accessor::Mean => win
                        .window
                        .mean()
                        .ok_or_else(|| Error::Arithmetic("mean of an empty window".into())),
                    Accessor::Latest => win
                        .window
                        .latest()
                        .ok_or_else(|| Error::Arithmetic("latest of an empty window".into())),
                    Accessor::Interval => {
                        let (base_interval, phi) = win.params.ok_or_else(|| {
                            Error::Extension(
                                "`object->interval` needs a window constructed with Δ and φ".into(),
                            )
                        })?;
                        expected_interval(&win.window.differences(), base_interval, phi)
                    }
                }
            }
            Expr::Neg(inner) => Ok(-inner.eval(ctx)?),
            Expr::Abs(inner) => Ok(inner.eval(ctx)?.abs()),
            Expr::Bin(op, lhs, rhs) => {
                let l = lhs.eval(ctx)?;
                let r = rhs.eval(ctx)?;
                Ok(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                })
            }
        }
    }
}
