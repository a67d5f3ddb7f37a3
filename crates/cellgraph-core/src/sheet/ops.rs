use super::Spreadsheet;
use crate::error::Result;
use cellgraph_engine::engine::{
    Cell, CellContents, CellValue, EvalError, Formula, FormulaFormatError, LookupError,
    StagedDependees, cells_to_recalculate,
};
use std::collections::BTreeSet;
use tracing::debug;

impl Spreadsheet {
    /// Set a cell from raw input and recompute everything that depends on it.
    ///
    /// - Empty input clears the cell
    /// - A number (e.g. `42`, `2.5e3`) -> number cell
    /// - Starts with '=' -> formula over other cells
    /// - Otherwise -> text, kept verbatim
    ///
    /// Returns the cells whose values were recomputed, the changed cell first
    /// and every other cell after all cells it depends on. Clearing a cell
    /// returns an empty list, though its dependents are still recomputed.
    ///
    /// On error the spreadsheet is unchanged. A formula that would make a
    /// cell depend on itself fails with [`crate::SheetError::CircularDependency`].
    pub fn set_contents_of_cell(&mut self, name: &str, contents: &str) -> Result<Vec<String>> {
        let name = self.normalize_name(name)?;
        let parsed = CellContents::from_input(contents, &self.normalize, &self.is_valid)?;

        let order = match parsed {
            None => {
                self.clear_cell(&name)?;
                return Ok(Vec::new());
            }
            Some(CellContents::Formula(formula)) => self.set_formula(&name, formula)?,
            Some(contents) => self.set_plain(&name, contents)?,
        };

        debug!(cell = %name, recalculated = order.len(), "cell updated");
        Ok(order)
    }

    /// Commit a text or number cell. Such a cell reads from nothing, so it
    /// can never close a cycle.
    fn set_plain(&mut self, name: &str, contents: CellContents) -> Result<Vec<String>> {
        let order = self.order_without_dependees(name)?;

        self.graph.replace_dependees(name, BTreeSet::<String>::new());
        self.cells.insert(name.to_string(), Cell::new(contents));
        self.changed = true;

        self.recalculate(&order);
        Ok(order)
    }

    /// Commit a formula cell after checking the proposed edges for cycles.
    fn set_formula(&mut self, name: &str, formula: Formula) -> Result<Vec<String>> {
        let order = {
            let staged = StagedDependees::new(&self.graph, name, formula.variables());
            cells_to_recalculate(&staged, name)?
        };

        self.graph.replace_dependees(name, formula.variables());
        self.cells
            .insert(name.to_string(), Cell::new(CellContents::Formula(formula)));
        self.changed = true;

        self.recalculate(&order);
        Ok(order)
    }

    fn clear_cell(&mut self, name: &str) -> Result<()> {
        if !self.cells.contains_key(name) {
            return Ok(());
        }
        let order = self.order_without_dependees(name)?;

        self.cells.remove(name);
        self.graph.replace_dependees(name, BTreeSet::<String>::new());
        self.changed = true;

        self.recalculate(&order);
        debug!(cell = %name, "cell cleared");
        Ok(())
    }

    /// Recalculation order for `name` once it reads from nothing, computed
    /// before anything is committed.
    fn order_without_dependees(&self, name: &str) -> Result<Vec<String>> {
        let none = BTreeSet::new();
        let staged = StagedDependees::new(&self.graph, name, &none);
        Ok(cells_to_recalculate(&staged, name)?)
    }

    /// Re-evaluate every formula cell in `order`. Other cells already hold
    /// their value.
    pub(crate) fn recalculate(&mut self, order: &[String]) {
        for name in order {
            let Some(formula) = self
                .cells
                .get(name)
                .and_then(|cell| cell.contents.as_formula())
                .cloned()
            else {
                continue;
            };

            let value = CellValue::from(formula.evaluate(|var| self.lookup(var)));
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    /// Parse a formula with this sheet's name rules.
    pub fn parse_formula(&self, raw: &str) -> std::result::Result<Formula, FormulaFormatError> {
        Formula::parse_with(raw, &self.normalize, &self.is_valid)
    }

    /// Evaluate a formula against the current cell values without storing it.
    pub fn evaluate(&self, formula: &Formula) -> std::result::Result<f64, EvalError> {
        formula.evaluate(|var| self.lookup(var))
    }

    /// Numeric value of a cell, as seen by formulas.
    fn lookup(&self, name: &str) -> std::result::Result<f64, LookupError> {
        match self.cells.get(name) {
            None => Err(LookupError::new(format!("depends on empty cell {}", name))),
            Some(cell) => cell.value.as_number().ok_or_else(|| {
                LookupError::new(format!(
                    "depends on a cell without a numerical value: {}",
                    name
                ))
            }),
        }
    }
}
