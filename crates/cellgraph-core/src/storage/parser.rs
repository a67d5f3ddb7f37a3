//! Parser for .cgs file format

use crate::error::ReadWriteError;
use cellgraph_engine::engine::parse_number;
use std::fs;
use std::path::Path;

type Result<T> = std::result::Result<T, ReadWriteError>;

/// One `NAME: FORM` line, decoded to the raw contents a user would type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetEntry {
    /// 1-based line number in the source.
    pub line: usize,
    pub name: String,
    pub contents: String,
}

/// Decoded .cgs file: the version tag plus cell entries in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetFile {
    pub version: String,
    pub entries: Vec<SheetEntry>,
}

/// Parse a .cgs file
pub fn parse_sheet(path: &Path) -> Result<SheetFile> {
    let content = fs::read_to_string(path)?;
    parse_sheet_content(&content)
}

/// Parse .cgs content from a string
pub fn parse_sheet_content(content: &str) -> Result<SheetFile> {
    let mut version: Option<String> = None;
    let mut entries = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        let line_num = line_num + 1;

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('@') {
            let (directive, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match directive {
                "version" if version.is_some() => {
                    return Err(ReadWriteError::Parse {
                        line: line_num,
                        message: "Duplicate @version directive".to_string(),
                    });
                }
                "version" => version = Some(parse_version(value.trim())),
                _ => {
                    return Err(ReadWriteError::Parse {
                        line: line_num,
                        message: format!("Unknown directive: @{}", directive),
                    });
                }
            }
            continue;
        }

        // Parse "NAME: FORM" format
        let Some((name, form)) = line.split_once(':') else {
            return Err(ReadWriteError::Parse {
                line: line_num,
                message: "Expected 'NAME: VALUE' format".to_string(),
            });
        };

        entries.push(SheetEntry {
            line: line_num,
            name: name.trim().to_string(),
            contents: parse_form(form.trim(), line_num)?,
        });
    }

    let version = version.ok_or(ReadWriteError::MissingVersion)?;
    Ok(SheetFile { version, entries })
}

/// Version tags are bare words, or quoted and escaped like text.
fn parse_version(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        unescape_text(&value[1..value.len() - 1])
    } else {
        value.to_string()
    }
}

/// Decode a saved form into raw cell contents.
fn parse_form(form: &str, line_num: usize) -> Result<String> {
    if form.is_empty() {
        return Err(ReadWriteError::Parse {
            line: line_num,
            message: "Missing value".to_string(),
        });
    }

    // Formulas are stored exactly as typed.
    if form.starts_with('=') {
        return Ok(form.to_string());
    }

    if form.starts_with('"') && form.ends_with('"') && form.len() >= 2 {
        return Ok(unescape_text(&form[1..form.len() - 1]));
    }

    if parse_number(form).is_some() {
        return Ok(form.to_string());
    }

    Err(ReadWriteError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", form),
    })
}

fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(content: &str) -> Vec<(String, String)> {
        parse_sheet_content(content)
            .unwrap()
            .entries
            .into_iter()
            .map(|e| (e.name, e.contents))
            .collect()
    }

    fn single(form: &str) -> String {
        let content = format!("@version v1\nA1: {}", form);
        entries(&content).remove(0).1
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(single("42"), "42");
        assert_eq!(single("2.5e3"), "2.5e3");
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(single(r#""Hello""#), "Hello");
        assert_eq!(single(r#""a: b""#), "a: b");
        assert_eq!(single(r#""""#), "");
    }

    #[test]
    fn test_parse_text_escapes() {
        assert_eq!(single(r#""He said \"hi\"""#), "He said \"hi\"");
        assert_eq!(single(r#""one\ntwo\tthree\\""#), "one\ntwo\tthree\\");
        assert_eq!(single(r#""keep \q""#), "keep \\q");
    }

    #[test]
    fn test_parse_quoted_version() {
        let version = |content: &str| parse_sheet_content(content).unwrap().version;
        assert_eq!(version("@version \" v1 \"\n"), " v1 ");
        assert_eq!(version("@version \"a\\nB1: 5\"\n"), "a\nB1: 5");
        assert_eq!(version("@version \"\"\n"), "");
        assert!(parse_sheet_content("@version \"a\\nB1: 5\"\n").unwrap().entries.is_empty());
    }

    #[test]
    fn test_parse_formula() {
        assert_eq!(single("=B1 + C1"), "=B1 + C1");
    }

    #[test]
    fn test_parse_version_and_order() {
        let content = r#"
# Test spreadsheet
@version  budget-2
B3: =A1 + A2
A1: 100

# Another comment
A3: "Total"
"#;
        let file = parse_sheet_content(content).unwrap();
        assert_eq!(file.version, "budget-2");
        assert_eq!(
            file.entries,
            vec![
                SheetEntry {
                    line: 4,
                    name: "B3".to_string(),
                    contents: "=A1 + A2".to_string(),
                },
                SheetEntry {
                    line: 5,
                    name: "A1".to_string(),
                    contents: "100".to_string(),
                },
                SheetEntry {
                    line: 8,
                    name: "A3".to_string(),
                    contents: "Total".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_version() {
        let err = parse_sheet_content("A1: 1\n").unwrap_err();
        assert!(matches!(err, ReadWriteError::MissingVersion));
    }

    #[test]
    fn test_malformed_lines() {
        let cases = [
            ("@version a\n@version b\n", 2),
            ("@version a\n@author me\n", 2),
            ("@version a\nA1 42\n", 2),
            ("@version a\n\nA1: hello\n", 3),
            ("@version a\nA1:\n", 2),
        ];
        for (content, expected_line) in cases {
            match parse_sheet_content(content) {
                Err(ReadWriteError::Parse { line, .. }) => assert_eq!(line, expected_line),
                other => panic!("{content:?}: expected parse error, got {other:?}"),
            }
        }
    }
}
