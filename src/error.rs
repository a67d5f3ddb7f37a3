//! Error types for the cellgraph command line

use thiserror::Error;

/// Errors in command-line arguments
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Invalid assignment {0:?}: expected NAME=CONTENTS")]
    InvalidAssignment(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),
}
