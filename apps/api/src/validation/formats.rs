use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-\.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

// scheme ":" then a non-empty remainder without whitespace; hierarchical
// schemes must carry a host.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:(//[^\s/?#]+[^\s]*|[^\s/][^\s]*)$")
        .expect("url pattern compiles")
});

pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

pub fn is_url(s: &str) -> bool {
    URL_RE.is_match(s)
}

pub fn is_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub fn is_date_time(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

pub fn is_time(s: &str) -> bool {
    chrono::NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
        || chrono::NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("first.last+tag@mail.example.org"));
        assert!(!is_email("ada@"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("a b@example.com"));
    }

    #[test]
    fn test_url() {
        assert!(is_url("https://github.com/ada"));
        assert!(is_url("mailto:ada@example.com"));
        assert!(!is_url("github.com/ada"));
        assert!(!is_url("https://"));
        assert!(!is_url("https://exa mple.com"));
    }

    #[test]
    fn test_temporal_formats() {
        assert!(is_date("2024-02-29"));
        assert!(!is_date("2023-02-29"));
        assert!(is_date_time("2024-01-01T10:00:00Z"));
        assert!(!is_date_time("2024-01-01 10:00"));
        assert!(is_time("09:30"));
        assert!(is_time("09:30:15"));
        assert!(!is_time("25:00"));
    }
}
