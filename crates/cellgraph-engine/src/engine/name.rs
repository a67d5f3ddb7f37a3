//! Cell and variable name grammar.
//!
//! Cell names and formula variables share one shape: a letter or underscore
//! followed by any number of letters, underscores, or digits. `x`, `_`, `A1`
//! and `y_15` are valid; `25`, `2x` and `&` are not. Names are case sensitive
//! unless a normalizer folds them.

use regex::Regex;
use std::sync::OnceLock;

/// Returns true if `name` matches `[A-Za-z_][A-Za-z_0-9]*`.
pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

fn name_re() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*$").expect("cell name regex must compile")
    })
}
