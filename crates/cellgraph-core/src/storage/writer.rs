//! Writer for .cgs file format

use crate::error::ReadWriteError;
use cellgraph_engine::engine::CellContents;
use std::fs;
use std::path::Path;

const HEADER: &str = "# cellgraph spreadsheet";

/// Write cells to a .cgs file
pub fn write_sheet<'a, I>(path: &Path, version: &str, cells: I) -> Result<(), ReadWriteError>
where
    I: IntoIterator<Item = (&'a str, &'a CellContents)>,
{
    let content = write_sheet_content(version, cells);
    fs::write(path, content)?;
    Ok(())
}

/// Write cells to a .cgs format string
pub fn write_sheet_content<'a, I>(version: &str, cells: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a CellContents)>,
{
    let mut lines = vec![HEADER.to_string(), format!("@version {}", version_form(version))];

    // Sort by name for consistent output
    let mut cells: Vec<_> = cells.into_iter().collect();
    cells.sort_by(|a, b| a.0.cmp(b.0));

    for (name, contents) in cells {
        let form = match contents {
            CellContents::Text(s) if s.is_empty() => continue,
            CellContents::Text(s) => format!("\"{}\"", escape_text(s)),
            CellContents::Number(_) | CellContents::Formula(_) => contents.to_input_string(),
        };
        lines.push(format!("{}: {}", name, form));
    }

    lines.join("\n") + "\n"
}

/// A version tag is written bare unless it would not read back as one word.
fn version_form(version: &str) -> String {
    let needs_quotes = version.is_empty()
        || version
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '\\');
    if needs_quotes {
        format!("\"{}\"", escape_text(version))
    } else {
        version.to_string()
    }
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
