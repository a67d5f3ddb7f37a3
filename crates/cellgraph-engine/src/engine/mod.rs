//! Formula engine API.
//!
//! This module provides the computation core of the spreadsheet:
//!
//! - [`tokenize`], [`Lexeme`] - Split formula text into lexemes
//! - [`Formula`] - Parse and validate formulas against the grammar rules
//! - [`Formula::evaluate`] - Two-stack evaluation with a variable lookup
//! - [`DependencyGraph`] - "t depends on s" pairs between cells
//! - [`cells_to_recalculate`] - Recalculation order and cycle detection
//! - [`CellContents`], [`CellValue`], [`Cell`] - Cell storage types
//! - [`is_valid_name`] - Cell and variable name grammar
//! - [`format_number`], [`canonical_number`] - Number display and canonical form

mod cell;
mod cycle;
mod deps;
mod eval;
mod format;
mod formula;
mod name;
mod token;

pub use cell::{Cell, CellContents, CellValue};
pub use cycle::{CycleError, cells_to_recalculate};
pub use deps::{DependencyGraph, DependencyView, StagedDependees};
pub use eval::{EvalError, LookupError};
pub use format::{canonical_number, format_number, parse_number};
pub use formula::{Formula, FormulaFormatError, FormulaRule, Token};
pub use name::is_valid_name;
pub use token::{Lexeme, Operator, Tokens, tokenize};
