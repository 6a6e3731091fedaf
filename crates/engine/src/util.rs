//! Internal helpers for input normalization and validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{Currency, EngineError, ResultEngine};

/// Trim a required display name and collapse inner whitespace.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(collapsed)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Comparison key for names: NFKD, combining marks dropped, lowercase,
/// punctuation runs folded into single spaces. "José", "jose" and " JOSE "
/// all share one key.
pub(crate) fn name_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Ensure a stored currency matches the group currency.
pub(crate) fn ensure_group_currency(group_currency: Currency, actual: Currency) -> ResultEngine<()> {
    if group_currency != actual {
        return Err(EngineError::CurrencyMismatch(format!(
            "group currency is {}, got {}",
            group_currency.code(),
            actual.code()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_folds_case_accents_and_spacing() {
        assert_eq!(name_key("José"), "jose");
        assert_eq!(name_key("  JOSE "), "jose");
        assert_eq!(name_key("Anne-Marie"), "anne marie");
        assert_eq!(name_key("anne   marie"), "anne marie");
    }

    #[test]
    fn required_name_collapses_whitespace() {
        assert_eq!(
            normalize_required_name("  Trip   to  Rome ", "group").unwrap(),
            "Trip to Rome"
        );
        assert_eq!(
            normalize_required_name("   ", "group").unwrap_err(),
            EngineError::InvalidInput("group name must not be empty".to_string())
        );
    }
}
