//! Error types for cellgraph core.

use cellgraph_engine::engine::{CycleError, FormulaFormatError};
use thiserror::Error;

/// Errors from spreadsheet operations.
///
/// A failed operation never leaves the spreadsheet partially updated.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    #[error("Invalid formula")]
    Formula(#[from] FormulaFormatError),

    #[error("Circular dependency detected")]
    CircularDependency(#[from] CycleError),

    #[error(transparent)]
    ReadWrite(#[from] ReadWriteError),
}

/// Errors reading or writing a spreadsheet file.
#[derive(Error, Debug)]
pub enum ReadWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Missing @version directive")]
    MissingVersion,

    #[error("Version mismatch: expected {expected:?}, found {found:?}")]
    VersionMismatch { expected: String, found: String },

    #[error("Line {line}: cannot set {name}")]
    Replay {
        line: usize,
        name: String,
        #[source]
        source: Box<SheetError>,
    },

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SheetError>;
