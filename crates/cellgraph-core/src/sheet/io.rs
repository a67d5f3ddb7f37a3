use super::Spreadsheet;
use crate::error::ReadWriteError;
use crate::storage::{SheetFile, parse_sheet, parse_sheet_content, write_sheet, write_sheet_content};
use std::path::{Path, PathBuf};
use tracing::debug;

type Result<T> = std::result::Result<T, ReadWriteError>;

impl Spreadsheet {
    /// Save to `path` and remember it as the current file.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        write_sheet(path, &self.version, self.contents_by_name())?;
        debug!(path = %path.display(), cells = self.len(), "sheet saved");
        self.file_path = Some(path.to_path_buf());
        self.changed = false;
        Ok(())
    }

    /// Save to the current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(ReadWriteError::NoFilePath);
        };
        self.save(&path)?;
        Ok(path)
    }

    /// The .cgs text that [`Spreadsheet::save`] would write.
    pub fn to_sheet_string(&self) -> String {
        write_sheet_content(&self.version, self.contents_by_name())
    }

    /// Load a spreadsheet from a .cgs file.
    ///
    /// The file's version tag must equal `version`. Every saved cell is
    /// replayed through [`Spreadsheet::set_contents_of_cell`] with the given
    /// rules; if any step fails the whole load fails.
    pub fn load<V, N>(path: &Path, is_valid: V, normalize: N, version: &str) -> Result<Spreadsheet>
    where
        V: Fn(&str) -> bool + 'static,
        N: Fn(&str) -> String + 'static,
    {
        let file = parse_sheet(path)?;
        let mut sheet = Self::replay(file, is_valid, normalize, version)?;
        sheet.file_path = Some(path.to_path_buf());
        debug!(path = %path.display(), cells = sheet.len(), "sheet loaded");
        Ok(sheet)
    }

    /// Load a spreadsheet from .cgs text.
    pub fn load_content<V, N>(
        content: &str,
        is_valid: V,
        normalize: N,
        version: &str,
    ) -> Result<Spreadsheet>
    where
        V: Fn(&str) -> bool + 'static,
        N: Fn(&str) -> String + 'static,
    {
        let file = parse_sheet_content(content)?;
        Self::replay(file, is_valid, normalize, version)
    }

    fn replay<V, N>(file: SheetFile, is_valid: V, normalize: N, version: &str) -> Result<Spreadsheet>
    where
        V: Fn(&str) -> bool + 'static,
        N: Fn(&str) -> String + 'static,
    {
        if file.version != version {
            return Err(ReadWriteError::VersionMismatch {
                expected: version.to_string(),
                found: file.version,
            });
        }

        let mut sheet = Spreadsheet::with_rules(is_valid, normalize, file.version);
        for entry in file.entries {
            sheet
                .set_contents_of_cell(&entry.name, &entry.contents)
                .map_err(|source| ReadWriteError::Replay {
                    line: entry.line,
                    name: entry.name.clone(),
                    source: Box::new(source),
                })?;
        }
        sheet.changed = false;
        Ok(sheet)
    }
}
