//! Tokenizer for formula text.
//!
//! [`tokenize`] splits raw formula text into a lazy sequence of [`Lexeme`]s:
//!
//! - `(` and `)`
//! - the operators `+ - * /`
//! - variables shaped like `[A-Za-z_][A-Za-z_0-9]*`
//! - decimal or scientific literals such as `3`, `3.`, `.5`, `2.5e-3`
//!
//! Whitespace only separates tokens (`xy` is one variable, `x y` is two).
//! Anything else is yielded as [`Lexeme::Unknown`] so the parser can reject
//! it with a grammar error; the tokenizer itself never fails.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One of the four binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_symbol(symbol: char) -> Option<Operator> {
        match symbol {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// `+` or `-`.
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Sub)
    }

    /// `*` or `/`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A classified slice of formula text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lexeme<'a> {
    LParen,
    RParen,
    Operator(Operator),
    Variable(&'a str),
    Number(&'a str),
    /// A run of characters that matches no token shape.
    Unknown(&'a str),
}

impl Lexeme<'_> {
    /// Number or variable shaped, before any normalization or validation.
    pub fn is_operand(&self) -> bool {
        matches!(self, Lexeme::Variable(_) | Lexeme::Number(_))
    }
}

impl fmt::Display for Lexeme<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::LParen => write!(f, "("),
            Lexeme::RParen => write!(f, ")"),
            Lexeme::Operator(op) => write!(f, "{}", op),
            Lexeme::Variable(s) | Lexeme::Number(s) | Lexeme::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Lazy lexeme iterator over formula text.
///
/// Cloning the iterator restarts from the clone point; the underlying text is
/// never copied.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
    pending: Option<Lexeme<'a>>,
}

/// Split formula text into lexemes.
pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens {
        input,
        pos: 0,
        pending: None,
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Lexeme<'a>> {
        if let Some(lexeme) = self.pending.take() {
            return Some(lexeme);
        }

        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            let Some(m) = token_re().find(rest) else {
                self.pos = self.input.len();
                return Some(Lexeme::Unknown(rest));
            };

            self.pos += m.end();
            let gap = &rest[..m.start()];
            let lexeme = classify(m.as_str());

            // Text between two matches never contains whitespace, since
            // whitespace is itself a match.
            if !gap.is_empty() {
                self.pending = lexeme;
                return Some(Lexeme::Unknown(gap));
            }
            if lexeme.is_some() {
                return lexeme;
            }
        }

        None
    }
}

/// Classify a regex match. Returns `None` for whitespace.
fn classify(text: &str) -> Option<Lexeme<'_>> {
    let first = text.chars().next()?;
    match first {
        '(' => Some(Lexeme::LParen),
        ')' => Some(Lexeme::RParen),
        c if c.is_whitespace() => None,
        c if c.is_ascii_alphabetic() || c == '_' => Some(Lexeme::Variable(text)),
        c if c.is_ascii_digit() || c == '.' => Some(Lexeme::Number(text)),
        c => Operator::from_symbol(c).map(Lexeme::Operator),
    }
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"\(|\)|[+\-*/]|[A-Za-z_][A-Za-z_0-9]*|(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][+\-]?[0-9]+)?|\s+",
        )
        .expect("token regex must compile")
    })
}
