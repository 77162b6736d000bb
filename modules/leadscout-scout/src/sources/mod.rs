pub mod linkedin;
pub mod reddit;
pub mod x;

pub use linkedin::LinkedInSource;
pub use reddit::RedditSource;
pub use x::XSource;

/// Cheap pre-filter applied before any model call: does the text mention at
/// least one target keyword (case-insensitive)?
pub(crate) fn matches_keywords(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["reporting".to_string(), "Excel".to_string()]
    }

    #[test]
    fn matches_case_insensitively() {
        assert!(matches_keywords("Drowning in EXCEL sheets", &keywords()));
        assert!(matches_keywords("weekly reporting is killing me", &keywords()));
    }

    #[test]
    fn no_match_no_keywords_mentioned() {
        assert!(!matches_keywords("Buy my crypto!", &keywords()));
    }
}
