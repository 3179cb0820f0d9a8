//! Row filters shared by the indexer adapters.

use regex_lite::Regex;

/// Accept a listing only when its title contains at least one
/// meaningful query token (length > 2), case-insensitively. Keeps
/// obviously unrelated rows out without being strict about word order.
pub fn matches_query_tokens(name: &str, query: &str) -> bool {
    let name_lower = name.to_lowercase();
    query
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .any(|t| name_lower.contains(&t.to_lowercase()))
}

/// Year false-positive filter: reject a title that advertises some
/// year when the expected one is absent. Titles without any year-like
/// token pass (many legitimate releases omit the year). Resolution tags
/// like "1080p" are not year-like.
pub fn year_matches(name: &str, year: Option<i32>) -> bool {
    let Some(year) = year else {
        return true;
    };
    if name.contains(&year.to_string()) {
        return true;
    }
    let year_like = Regex::new(r"(19|20)\d{2}")
        .map(|re| re.is_match(name))
        .unwrap_or(false);
    !year_like
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_filter_matches_partial() {
        assert!(matches_query_tokens(
            "Three.Seconds.2017.1080p.BluRay",
            "Three Seconds 2017"
        ));
        assert!(matches_query_tokens("ДВИЖЕНИЕ ВВЕРХ (2017)", "Движение вверх"));
    }

    #[test]
    fn test_token_filter_ignores_short_tokens() {
        // "up" is too short to count as a match on its own
        assert!(!matches_query_tokens("Unrelated Release", "Up 2009"));
    }

    #[test]
    fn test_token_filter_rejects_unrelated() {
        assert!(!matches_query_tokens("Completely Different Movie", "Three Seconds"));
    }

    #[test]
    fn test_year_filter_accepts_matching_year() {
        assert!(year_matches("Movie (2017) 1080p", Some(2017)));
    }

    #[test]
    fn test_year_filter_rejects_wrong_year() {
        assert!(!year_matches("Movie (2015) 1080p", Some(2017)));
    }

    #[test]
    fn test_year_filter_permissive_without_year_token() {
        assert!(year_matches("Movie 1080p BluRay", Some(2017)));
    }

    #[test]
    fn test_year_filter_permissive_without_expected_year() {
        assert!(year_matches("Movie (2015)", None));
    }
}
