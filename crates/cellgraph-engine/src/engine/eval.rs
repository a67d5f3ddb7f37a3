//! Formula evaluation.
//!
//! Formulas are evaluated left to right with an operand stack and an operator
//! stack, so `*` and `/` bind tighter than `+` and `-` and parentheses group.
//! Evaluation never panics: undefined variables and division by zero come back
//! as an [`EvalError`] value, which the spreadsheet stores as the cell's value.

use thiserror::Error;

use super::formula::{Formula, Token};
use super::token::Operator;

/// A variable lookup could not produce a number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LookupError {
    message: String,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> LookupError {
        LookupError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a formula's value could not be computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{reason}")]
    Lookup { variable: String, reason: String },

    /// The token sequence did not reduce to a single value. Formulas built by
    /// [`Formula::parse_with`] never produce this.
    #[error("malformed formula")]
    Malformed,
}

impl EvalError {
    /// Human-readable explanation, suitable for display in a cell.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Operator(Operator),
    LParen,
}

/// Operand and operator stacks for a single evaluation.
#[derive(Default)]
struct Stacks {
    operands: Vec<f64>,
    operators: Vec<Pending>,
}

impl Stacks {
    fn top_is(&self, pred: fn(Operator) -> bool) -> bool {
        matches!(self.operators.last(), Some(Pending::Operator(op)) if pred(*op))
    }

    fn pop_operand(&mut self) -> Result<f64, EvalError> {
        self.operands.pop().ok_or(EvalError::Malformed)
    }

    fn pop_operator(&mut self) -> Result<Operator, EvalError> {
        match self.operators.pop() {
            Some(Pending::Operator(op)) => Ok(op),
            _ => Err(EvalError::Malformed),
        }
    }

    /// Apply the pending operator on top of the stack to `rhs` and the
    /// operand below it.
    fn apply_pending(&mut self, rhs: f64) -> Result<(), EvalError> {
        let op = self.pop_operator()?;
        let lhs = self.pop_operand()?;
        self.operands.push(apply(lhs, op, rhs)?);
        Ok(())
    }

    /// Apply the pending operator to the top two operands.
    fn reduce(&mut self) -> Result<(), EvalError> {
        let rhs = self.pop_operand()?;
        self.apply_pending(rhs)
    }

    fn push_value(&mut self, value: f64) -> Result<(), EvalError> {
        if self.top_is(Operator::is_multiplicative) {
            self.apply_pending(value)
        } else {
            self.operands.push(value);
            Ok(())
        }
    }

    fn close_paren(&mut self) -> Result<(), EvalError> {
        if self.top_is(Operator::is_additive) {
            self.reduce()?;
        }
        if self.operators.pop() != Some(Pending::LParen) {
            return Err(EvalError::Malformed);
        }
        if self.top_is(Operator::is_multiplicative) {
            self.reduce()?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<f64, EvalError> {
        if !self.operators.is_empty() {
            self.reduce()?;
        }
        match (self.operands.as_slice(), self.operators.is_empty()) {
            ([value], true) => Ok(*value),
            _ => Err(EvalError::Malformed),
        }
    }
}

fn apply(lhs: f64, op: Operator, rhs: f64) -> Result<f64, EvalError> {
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Sub => Ok(lhs - rhs),
        Operator::Mul => Ok(lhs * rhs),
        Operator::Div => {
            if rhs == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
    }
}

impl Formula {
    /// Evaluate this formula, resolving each variable through `lookup`.
    ///
    /// Variables are passed to `lookup` in their normalized form. A lookup
    /// failure becomes [`EvalError::Lookup`] carrying the lookup's message.
    pub fn evaluate<L>(&self, lookup: L) -> Result<f64, EvalError>
    where
        L: Fn(&str) -> Result<f64, LookupError>,
    {
        let mut stacks = Stacks::default();

        for token in self.tokens() {
            match token {
                Token::Number(n) => stacks.push_value(*n)?,
                Token::Variable(name) => {
                    let value = lookup(name).map_err(|e| EvalError::Lookup {
                        variable: name.clone(),
                        reason: e.message,
                    })?;
                    stacks.push_value(value)?;
                }
                Token::Operator(op) if op.is_additive() => {
                    if stacks.top_is(Operator::is_additive) {
                        stacks.reduce()?;
                    }
                    stacks.operators.push(Pending::Operator(*op));
                }
                Token::Operator(op) => stacks.operators.push(Pending::Operator(*op)),
                Token::LParen => stacks.operators.push(Pending::LParen),
                Token::RParen => stacks.close_paren()?,
            }
        }

        stacks.finish()
    }
}
