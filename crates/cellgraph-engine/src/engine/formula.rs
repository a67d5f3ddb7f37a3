//! Formula parsing and validation.
//!
//! A [`Formula`] is an immutable, validated sequence of [`Token`]s built from
//! infix text such as `(A1 + 2) * b_3`. Construction enforces the grammar
//! rules listed on [`FormulaRule`]; the first violation found is returned as a
//! [`FormulaFormatError`].
//!
//! Numbers are canonicalized (`3.0`, `3.` and `3` are the same token) and
//! variables pass through a caller-supplied normalizer before they are
//! validated and stored. Equality and hashing compare the canonical token
//! sequence, so `"x + 2.0"` equals `"x+2"` but not `"2+x"`.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::format::{canonical_number, parse_number};
use super::name::is_valid_name;
use super::token::{Lexeme, Operator, tokenize};

/// The grammar rule a rejected formula violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormulaRule {
    /// There must be at least one token.
    OneToken,
    /// The first token must be a number, a variable, or `(`.
    StartingToken,
    /// The last token must be a number, a variable, or `)`.
    EndingToken,
    /// Reading left to right, `)` may never outnumber `(`.
    RightParentheses,
    /// The total counts of `(` and `)` must match.
    BalancedParentheses,
    /// `(` or an operator must be followed by a number, a variable, or `(`.
    ParenthesisOperatorFollowing,
    /// A number, a variable, or `)` must be followed by an operator or `)`.
    ExtraFollowing,
    /// A normalized variable must be well formed and accepted by the validator.
    VariableValidity,
}

impl fmt::Display for FormulaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormulaRule::OneToken => "One-Token Rule",
            FormulaRule::StartingToken => "Starting-Token Rule",
            FormulaRule::EndingToken => "Ending-Token Rule",
            FormulaRule::RightParentheses => "Right-Parentheses Rule",
            FormulaRule::BalancedParentheses => "Balanced-Parentheses Rule",
            FormulaRule::ParenthesisOperatorFollowing => "Parenthesis/Operator-Following Rule",
            FormulaRule::ExtraFollowing => "Extra-Following Rule",
            FormulaRule::VariableValidity => "Variable Validity",
        };
        f.write_str(name)
    }
}

/// A syntactically invalid formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaFormatError {
    #[error("One-Token Rule: formula is empty")]
    Empty,

    #[error("Starting-Token Rule: formula cannot start with `{token}`")]
    StartingToken { token: String },

    #[error("Ending-Token Rule: formula cannot end with `{token}`")]
    EndingToken { token: String },

    #[error("Right-Parentheses Rule: unmatched `)` at token {position}")]
    RightParentheses { position: usize },

    #[error("Balanced-Parentheses Rule: {open} `(` but {close} `)`")]
    BalancedParentheses { open: usize, close: usize },

    #[error("Parenthesis/Operator-Following Rule: `{token}` cannot be followed by `{next}`")]
    ParenthesisOperatorFollowing { token: String, next: String },

    #[error("Extra-Following Rule: `{token}` cannot be followed by `{next}`")]
    ExtraFollowing { token: String, next: String },

    #[error("invalid variable `{variable}`")]
    InvalidVariable { variable: String },
}

impl FormulaFormatError {
    /// The rule this error reports.
    pub fn rule(&self) -> FormulaRule {
        match self {
            FormulaFormatError::Empty => FormulaRule::OneToken,
            FormulaFormatError::StartingToken { .. } => FormulaRule::StartingToken,
            FormulaFormatError::EndingToken { .. } => FormulaRule::EndingToken,
            FormulaFormatError::RightParentheses { .. } => FormulaRule::RightParentheses,
            FormulaFormatError::BalancedParentheses { .. } => FormulaRule::BalancedParentheses,
            FormulaFormatError::ParenthesisOperatorFollowing { .. } => {
                FormulaRule::ParenthesisOperatorFollowing
            }
            FormulaFormatError::ExtraFollowing { .. } => FormulaRule::ExtraFollowing,
            FormulaFormatError::InvalidVariable { .. } => FormulaRule::VariableValidity,
        }
    }
}

/// A validated, normalized formula token.
#[derive(Clone, Debug)]
pub enum Token {
    /// A finite, non-negative number.
    Number(f64),
    /// A normalized variable name.
    Variable(String),
    Operator(Operator),
    LParen,
    RParen,
}

impl Token {
    /// Number, variable, or `(`: what may follow `(` or an operator.
    fn opens_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_) | Token::LParen)
    }

    /// Operator or `)`: what may follow a number, variable, or `)`.
    fn continues_operand(&self) -> bool {
        matches!(self, Token::Operator(_) | Token::RParen)
    }

    fn expects_operand(&self) -> bool {
        matches!(self, Token::Operator(_) | Token::LParen)
    }
}

// Numbers are finite and never negative zero, so bit equality is the same as
// equality of their canonical spelling.
impl PartialEq for Token {
    fn eq(&self, other: &Token) -> bool {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => a.to_bits() == b.to_bits(),
            (Token::Variable(a), Token::Variable(b)) => a == b,
            (Token::Operator(a), Token::Operator(b)) => a == b,
            (Token::LParen, Token::LParen) | (Token::RParen, Token::RParen) => true,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Token::Number(n) => n.to_bits().hash(state),
            Token::Variable(name) => name.hash(state),
            Token::Operator(op) => op.hash(state),
            Token::LParen | Token::RParen => {}
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => f.write_str(&canonical_number(*n)),
            Token::Variable(name) => f.write_str(name),
            Token::Operator(op) => write!(f, "{}", op),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// An immutable infix formula over numbers and named variables.
///
/// Cloning is cheap: the token list and variable set are shared.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Arc<[Token]>,
    variables: Arc<BTreeSet<String>>,
}

impl Formula {
    /// Parse with the identity normalizer and a validator that accepts every
    /// well-formed variable.
    pub fn parse(raw: &str) -> Result<Formula, FormulaFormatError> {
        Formula::parse_with(raw, |v| v.to_string(), |_| true)
    }

    /// Parse `raw`, passing every variable through `normalize` and then
    /// requiring `is_valid` to accept the normalized name.
    ///
    /// A variable whose normalized form is not a legal name, or which
    /// `is_valid` rejects, fails with [`FormulaFormatError::InvalidVariable`].
    pub fn parse_with<N, V>(
        raw: &str,
        normalize: N,
        is_valid: V,
    ) -> Result<Formula, FormulaFormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let lexemes: Vec<Lexeme<'_>> = tokenize(raw).collect();

        let (Some(first), Some(last)) = (lexemes.first(), lexemes.last()) else {
            return Err(FormulaFormatError::Empty);
        };
        if !first.is_operand() && *first != Lexeme::LParen {
            return Err(FormulaFormatError::StartingToken {
                token: first.to_string(),
            });
        }
        if !last.is_operand() && *last != Lexeme::RParen {
            return Err(FormulaFormatError::EndingToken {
                token: last.to_string(),
            });
        }

        let mut tokens: Vec<Token> = Vec::with_capacity(lexemes.len());
        let mut variables = BTreeSet::new();
        let mut open = 0usize;
        let mut close = 0usize;

        for (position, lexeme) in lexemes.iter().enumerate() {
            let token = resolve(lexeme, &normalize, &is_valid)?;

            if let Some(prev) = tokens.last() {
                if prev.expects_operand() {
                    if !token.as_ref().is_some_and(Token::opens_operand) {
                        return Err(FormulaFormatError::ParenthesisOperatorFollowing {
                            token: prev.to_string(),
                            next: lexeme.to_string(),
                        });
                    }
                } else if !token.as_ref().is_some_and(Token::continues_operand) {
                    return Err(FormulaFormatError::ExtraFollowing {
                        token: prev.to_string(),
                        next: lexeme.to_string(),
                    });
                }
            }

            // Only a leading literal that does not fit in an f64 gets here.
            let Some(token) = token else {
                return Err(FormulaFormatError::StartingToken {
                    token: lexeme.to_string(),
                });
            };

            match &token {
                Token::LParen => open += 1,
                Token::RParen => close += 1,
                Token::Variable(name) => {
                    variables.insert(name.clone());
                }
                _ => {}
            }
            if close > open {
                return Err(FormulaFormatError::RightParentheses { position });
            }

            tokens.push(token);
        }

        if open != close {
            return Err(FormulaFormatError::BalancedParentheses { open, close });
        }

        Ok(Formula {
            tokens: tokens.into(),
            variables: Arc::new(variables),
        })
    }

    /// The validated token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Normalized variable names, each listed once, in sorted order.
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }
}

/// Turn a lexeme into a stored token. `Ok(None)` marks a lexeme that is not a
/// usable token; the grammar rules report it with context.
fn resolve<N, V>(
    lexeme: &Lexeme<'_>,
    normalize: &N,
    is_valid: &V,
) -> Result<Option<Token>, FormulaFormatError>
where
    N: Fn(&str) -> String,
    V: Fn(&str) -> bool,
{
    let token = match *lexeme {
        Lexeme::LParen => Some(Token::LParen),
        Lexeme::RParen => Some(Token::RParen),
        Lexeme::Operator(op) => Some(Token::Operator(op)),
        Lexeme::Number(literal) => parse_number(literal).map(Token::Number),
        Lexeme::Variable(raw) => {
            let variable = normalize(raw);
            if !is_valid_name(&variable) || !is_valid(&variable) {
                return Err(FormulaFormatError::InvalidVariable { variable });
            }
            Some(Token::Variable(variable))
        }
        Lexeme::Unknown(_) => None,
    };
    Ok(token)
}

impl PartialEq for Formula {
    fn eq(&self, other: &Formula) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

/// Canonical text with no whitespace; parsing it yields an equal formula.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tokens.iter() {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Formula {
    type Err = FormulaFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}
