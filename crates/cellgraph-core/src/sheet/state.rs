use crate::error::{Result, SheetError};
use cellgraph_engine::engine::{
    Cell, CellContents, CellValue, DependencyGraph, DependencyView, is_valid_name,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Version tag used when none is given.
pub const DEFAULT_VERSION: &str = "default";

/// Maps a cell name to its canonical form (e.g. upper-casing).
pub type Normalizer = Box<dyn Fn(&str) -> String>;

/// Extra predicate a normalized cell name must satisfy.
pub type Validator = Box<dyn Fn(&str) -> bool>;

/// UI-agnostic spreadsheet state.
///
/// Cells are keyed by normalized name. Empty cells are never stored: an
/// absent name reads as empty text.
pub struct Spreadsheet {
    /// Non-empty cells with their last computed values
    pub(crate) cells: BTreeMap<String, Cell>,
    /// "t depends on s" pairs between cell names
    pub(crate) graph: DependencyGraph,
    pub(crate) normalize: Normalizer,
    pub(crate) is_valid: Validator,
    pub(crate) version: String,
    /// File last loaded from or saved to
    pub(crate) file_path: Option<PathBuf>,
    /// Whether the sheet has been modified since it was created, loaded, or saved
    pub(crate) changed: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet with no extra name rules and the default
    /// version tag.
    pub fn new() -> Self {
        Self::with_rules(|_| true, |name| name.to_string(), DEFAULT_VERSION)
    }

    /// Create an empty spreadsheet.
    ///
    /// Every cell name and formula variable is passed through `normalize`;
    /// the result must still be a well-formed name and satisfy `is_valid`.
    pub fn with_rules<V, N>(is_valid: V, normalize: N, version: impl Into<String>) -> Self
    where
        V: Fn(&str) -> bool + 'static,
        N: Fn(&str) -> String + 'static,
    {
        Spreadsheet {
            cells: BTreeMap::new(),
            graph: DependencyGraph::new(),
            normalize: Box::new(normalize),
            is_valid: Box::new(is_valid),
            version: version.into(),
            file_path: None,
            changed: false,
        }
    }

    /// Check a cell name and return its normalized form.
    pub fn normalize_name(&self, name: &str) -> Result<String> {
        if !is_valid_name(name) {
            return Err(SheetError::InvalidName(name.to_string()));
        }
        let normalized = (self.normalize)(name);
        if !is_valid_name(&normalized) || !(self.is_valid)(&normalized) {
            return Err(SheetError::InvalidName(name.to_string()));
        }
        Ok(normalized)
    }

    /// Contents of a cell; empty text if the cell is empty.
    pub fn cell_contents(&self, name: &str) -> Result<CellContents> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents.clone())
            .unwrap_or_default())
    }

    /// Value of a cell; empty text if the cell is empty.
    pub fn cell_value(&self, name: &str) -> Result<CellValue> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value.clone())
            .unwrap_or_default())
    }

    /// Names of all non-empty cells, in sorted order.
    pub fn nonempty_cell_names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Names of the cells whose formulas reference `name` directly.
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<String>> {
        let name = self.normalize_name(name)?;
        Ok(self.graph.direct_dependents(&name))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Contents of every non-empty cell, in name order.
    pub(crate) fn contents_by_name(&self) -> impl Iterator<Item = (&str, &CellContents)> {
        self.cells
            .iter()
            .map(|(name, cell)| (name.as_str(), &cell.contents))
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("graph", &self.graph)
            .field("version", &self.version)
            .field("file_path", &self.file_path)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}
