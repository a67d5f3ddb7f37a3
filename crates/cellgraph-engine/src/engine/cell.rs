//! Cell data structures.
//!
//! - [`CellContents`] - What the user entered: text, a number, or a formula
//! - [`CellValue`] - What the cell evaluates to
//! - [`Cell`] - Contents plus the last computed value

use std::fmt;

use super::eval::EvalError;
use super::format::{canonical_number, format_number, parse_number};
use super::formula::{Formula, FormulaFormatError};

/// The contents of a non-empty cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContents {
    Text(String),
    Number(f64),
    Formula(Formula),
}

impl CellContents {
    /// Classify raw user input.
    ///
    /// - Empty string -> `None` (the cell is cleared)
    /// - A finite number -> `Number`
    /// - Starts with '=' -> `Formula` (the rest, parsed with the given rules)
    /// - Otherwise -> `Text`, kept verbatim
    pub fn from_input<N, V>(
        input: &str,
        normalize: N,
        is_valid: V,
    ) -> Result<Option<CellContents>, FormulaFormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        if input.is_empty() {
            return Ok(None);
        }
        if let Some(n) = parse_number(input) {
            return Ok(Some(CellContents::Number(n)));
        }
        if let Some(formula) = input.strip_prefix('=') {
            return Formula::parse_with(formula, normalize, is_valid)
                .map(|f| Some(CellContents::Formula(f)));
        }
        Ok(Some(CellContents::Text(input.to_string())))
    }

    /// Canonical input string that reproduces these contents.
    pub fn to_input_string(&self) -> String {
        match self {
            CellContents::Text(s) => s.clone(),
            CellContents::Number(n) => canonical_number(*n),
            CellContents::Formula(f) => format!("={}", f),
        }
    }

    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContents::Formula(f) => Some(f),
            _ => None,
        }
    }
}

impl Default for CellContents {
    fn default() -> Self {
        CellContents::Text(String::new())
    }
}

impl fmt::Display for CellContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_input_string())
    }
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Error(EvalError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl From<Result<f64, EvalError>> for CellValue {
    fn from(result: Result<f64, EvalError>) -> Self {
        match result {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Error(e) => write!(f, "#ERR: {}", e.reason()),
        }
    }
}

/// A non-empty cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub contents: CellContents,
    pub value: CellValue,
}

impl Cell {
    /// A cell whose value is known without evaluation. Formula cells read
    /// as empty text until the sheet recomputes them.
    pub fn new(contents: CellContents) -> Cell {
        let value = match &contents {
            CellContents::Text(s) => CellValue::Text(s.clone()),
            CellContents::Number(n) => CellValue::Number(*n),
            CellContents::Formula(_) => CellValue::default(),
        };
        Cell { contents, value }
    }
}
