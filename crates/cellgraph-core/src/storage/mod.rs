//! Storage module for the .cgs file format

mod parser;
mod writer;

pub use parser::{SheetEntry, SheetFile, parse_sheet, parse_sheet_content};
pub use writer::{write_sheet, write_sheet_content};
