//! Coercion of raw query-string values.

use super::PageLimits;
use std::cmp::Ordering;
use std::collections::HashMap;

/// `page`: default 1. Non-numeric input and values below 1 become 1.
/// All-digit values too large for any integer type saturate at `u32::MAX`.
pub fn parse_page(raw: Option<&str>) -> u32 {
    let Some(s) = raw.map(str::trim) else { return 1 };
    match s.parse::<i64>() {
        Ok(n) => n.clamp(1, u32::MAX as i64) as u32,
        Err(_) if is_unsigned_digits(s) => u32::MAX,
        Err(_) => 1,
    }
}

fn is_unsigned_digits(s: &str) -> bool {
    let digits = s.strip_prefix('+').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `per_page`: non-numeric input and values <= 0 become the default; large values clamp to the maximum.
pub fn parse_per_page(raw: Option<&str>, limits: &PageLimits) -> u32 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) if n > 0 => n.min(limits.max_per_page as i64) as u32,
        _ => limits.default_per_page,
    }
}

/// Trimmed, non-empty text value for a filter parameter.
pub fn text_filter(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Integer filter value. Values that do not parse are dropped.
pub fn int_filter(params: &HashMap<String, String>, key: &str) -> Option<i64> {
    let raw = text_filter(params, key)?;
    match raw.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(param = key, value = %raw, "ignoring non-numeric filter");
            None
        }
    }
}

/// Text ordering for in-memory sorts: case-folded first, then bytewise so equal folds stay deterministic.
pub fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Case-insensitive substring test, the in-memory counterpart of `ILIKE '%needle%'`.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PageLimits {
        PageLimits {
            default_per_page: 10,
            max_per_page: 100,
        }
    }

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(parse_page(Some(" 3 ")), 3);
        assert_eq!(parse_page(Some("99999999999")), u32::MAX);
        assert_eq!(parse_page(Some("99999999999999999999")), u32::MAX);
        assert_eq!(parse_page(Some("-99999999999999999999")), 1);
        assert_eq!(parse_page(Some("12abc")), 1);
    }

    #[test]
    fn per_page_falls_back_to_default() {
        let limits = limits();
        assert_eq!(parse_per_page(None, &limits), 10);
        assert_eq!(parse_per_page(Some(""), &limits), 10);
        assert_eq!(parse_per_page(Some("ten"), &limits), 10);
        assert_eq!(parse_per_page(Some("0"), &limits), 10);
        assert_eq!(parse_per_page(Some("-5"), &limits), 10);
        assert_eq!(parse_per_page(Some("25"), &limits), 25);
    }

    #[test]
    fn per_page_is_bounded() {
        assert_eq!(parse_per_page(Some("100"), &limits()), 100);
        assert_eq!(parse_per_page(Some("5000"), &limits()), 100);
    }

    #[test]
    fn blank_and_malformed_filters_are_dropped() {
        let params: HashMap<String, String> = [
            ("q".to_string(), "  ".to_string()),
            ("author".to_string(), " Orwell ".to_string()),
            ("year".to_string(), "nineteen".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(text_filter(&params, "q"), None);
        assert_eq!(text_filter(&params, "author").as_deref(), Some("Orwell"));
        assert_eq!(int_filter(&params, "year"), None);
        assert_eq!(int_filter(&params, "missing"), None);
    }

    #[test]
    fn contains_ignores_case() {
        assert!(contains_ci("Clean Code", "clean"));
        assert!(contains_ci("George ORWELL", "orwell"));
        assert!(!contains_ci("Clean Code", "python"));
    }

    #[test]
    fn text_ordering_ignores_case_first() {
        let mut names = vec!["banana", "Zebra", "apple", "Apple"];
        names.sort_by(|a, b| cmp_text(a, b));
        assert_eq!(names, vec!["Apple", "apple", "banana", "Zebra"]);
    }
}
