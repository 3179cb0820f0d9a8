//! Search query variant builder.
//!
//! Produces a prioritized list of query strings for a media record:
//! original-language title first (most indexers are English-centric),
//! then the localized title, year-qualified variants before bare ones,
//! punctuation-cleaned variants after the raw ones.

/// Strip punctuation that confuses tracker search engines, keeping
/// letters (any script), digits and spaces, and collapse whitespace.
pub fn clean_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the prioritized, deduplicated query list.
///
/// `title` is the display (possibly localized) title, `original_title`
/// the original-language one. Never returns an empty list when at least
/// one title is non-empty.
pub fn build_queries(title: &str, original_title: Option<&str>, year: Option<i32>) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();

    let original = original_title.unwrap_or("").trim();
    let localized = title.trim();
    let localized_distinct = !localized.is_empty() && localized != original;

    if let Some(year) = year {
        if !original.is_empty() {
            queries.push(format!("{original} {year}"));
            queries.push(format!("{} {year}", clean_title(original)));
        }
        if localized_distinct {
            queries.push(format!("{localized} {year}"));
            queries.push(format!("{} {year}", clean_title(localized)));
        }
    }

    if !original.is_empty() {
        queries.push(original.to_string());
    }
    if localized_distinct {
        queries.push(localized.to_string());
    }

    // Dedup preserving first occurrence
    let mut seen = std::collections::HashSet::new();
    queries.retain(|q| !q.trim().is_empty() && seen.insert(q.clone()));
    queries
}
