/// Languages offered by the selector, as (ISO 639-1 code, display name).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("ja", "Japanese"),
    ("ru", "Russian"),
    ("pt", "Portuguese"),
    ("it", "Italian"),
    ("ko", "Korean"),
];

/// Normalizes a selector value to a known code; unknown or blank => `None`.
pub fn normalize_code(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(c, _)| *c)
}

#[cfg(test)]
mod languages_tests {
    use super::*;

    #[test]
    fn table_has_twelve_unique_codes() {
        let mut codes: Vec<_> = LANGUAGES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 12);
    }

    #[test]
    fn lookup_is_case_and_space_insensitive() {
        assert_eq!(normalize_code(" ES "), Some("es"));
        assert_eq!(normalize_code("Ko"), Some("ko"));
        assert_eq!(normalize_code(""), None);
        assert_eq!(normalize_code("xx"), None);
    }
}
