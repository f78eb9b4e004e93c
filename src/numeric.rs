//! Defensive numeric parsing shared by every aggregation.
//!
//! Listing sources format prices and sizes inconsistently (`$1,299.99`,
//! `1299`, `55"`, `nan`). [`parse_numeric()`] strips everything that is not
//! a digit, a decimal point, or a leading minus sign before parsing, and
//! returns `None` instead of failing, so callers can exclude the row from
//! the one aggregation that needed the value without touching the rest.

/// Parses a raw cell into `f64`, tolerating currency symbols, thousands
/// separators, unit suffixes, and surrounding noise. Returns `None` when
/// nothing numeric remains or the residue is not a valid number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let negative = trimmed.starts_with('-') || trimmed.starts_with('△');
    let digits = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }
    let parsed: f64 = digits.parse().ok()?;
    Some(if negative { -parsed } else { parsed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_strips_currency_noise() {
        assert_eq!(parse_numeric("$1,299.99"), Some(1299.99));
        assert_eq!(parse_numeric(" 500 "), Some(500.0));
        assert_eq!(parse_numeric("55\""), Some(55.0));
    }

    #[test]
    fn parse_numeric_preserves_sign() {
        assert_eq!(parse_numeric("-42.5"), Some(-42.5));
        assert_eq!(parse_numeric("△12.00"), Some(-12.0));
    }

    #[test]
    fn parse_numeric_rejects_non_numeric_residue() {
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("nan"), None);
        assert_eq!(parse_numeric("1.2.3"), None);
    }
}
