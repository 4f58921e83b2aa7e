//! String helpers shared by the filter and aggregation engines.

/// Separator used by every multi-valued catalog field (`country`, `listed_in`, `cast`).
pub const MULTI_VALUE_SEPARATOR: &str = ", ";

/// Splits a multi-valued field on the canonical separator.
///
/// Empty and whitespace-only elements are dropped; nothing else is trimmed.
pub fn split_multi_value(raw: &str) -> impl Iterator<Item = &str> + '_ {
    raw.split(MULTI_VALUE_SEPARATOR)
        .filter(|part| !part.trim().is_empty())
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if haystack.is_ascii() && needle.is_ascii() {
        let needle = needle.as_bytes();
        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle));
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Returns the first contiguous run of ASCII digits, if any.
pub fn first_digit_run(raw: &str) -> Option<&str> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let rest = &raw[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Extracts the first digit run as a number: `"90 min"` gives `90.0`, `"N/A"` gives `None`.
pub fn extract_number(raw: &str) -> Option<f64> {
    first_digit_run(raw).and_then(|digits| digits.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_empty_elements() {
        let parts: Vec<&str> = split_multi_value("France, Belgium, ").collect();
        assert_eq!(parts, vec!["France", "Belgium"]);
    }

    #[test]
    fn test_split_uses_literal_separator() {
        let parts: Vec<&str> = split_multi_value("Dramas,Comedies, Thrillers").collect();
        assert_eq!(parts, vec!["Dramas,Comedies", "Thrillers"]);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("United States, India", "india"));
        assert!(contains_ignore_case("Amélie", "AMÉL"));
        assert!(!contains_ignore_case("Canada", "usa"));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("90 min"), Some(90.0));
        assert_eq!(extract_number("2 Seasons"), Some(2.0));
        assert_eq!(extract_number("Season 10, part 2"), Some(10.0));
        assert_eq!(extract_number("N/A"), None);
        assert_eq!(extract_number(""), None);
        assert_eq!(extract_number("٣ min"), None);
    }
}
