/// Parse a numeric literal into the value stored in a formula token.
///
/// Returns `None` when the literal does not parse or overflows to infinity,
/// so every stored number has a canonical spelling that re-parses to itself.
pub fn parse_number(literal: &str) -> Option<f64> {
    literal.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Canonical decimal spelling of a number.
///
/// This is the shortest string that round-trips to the same `f64`, written
/// without an exponent: `3.0`, `3.` and `3` all become `"3"`, `5e3` becomes
/// `"5000"`. Formula equality, hashing and the saved file format go through
/// this spelling.
pub fn canonical_number(n: f64) -> String {
    format!("{}", n)
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        let fixed = format!("{:.6}", n);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_number_unifies_spellings() {
        for literal in ["3", "3.", "3.0", "3.0000", "0.3e1"] {
            assert_eq!(canonical_number(parse_number(literal).unwrap()), "3");
        }
        assert_eq!(canonical_number(parse_number("5e3").unwrap()), "5000");
        assert_eq!(canonical_number(parse_number(".5").unwrap()), "0.5");
    }

    #[test]
    fn test_canonical_number_never_uses_exponent() {
        assert_eq!(canonical_number(1e21), "1000000000000000000000");
        assert_eq!(canonical_number(1e-7), "0.0000001");
    }

    #[test]
    fn test_parse_number_rejects_overflow() {
        assert_eq!(parse_number("1e999"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(5.0 / 12.0), "0.416667");
        assert_eq!(format_number(f64::INFINITY), "#INF!");
    }
}
