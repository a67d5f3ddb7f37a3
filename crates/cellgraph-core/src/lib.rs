//! cellgraph-core - UI-agnostic spreadsheet model + storage.

pub mod error;
pub mod sheet;
pub mod storage;

pub use error::{ReadWriteError, Result, SheetError};
pub use sheet::{DEFAULT_VERSION, Spreadsheet};

pub use cellgraph_engine::engine::{CellContents, CellValue, Formula};
