//! Rank extraction over normalized result lists.

use aivis_serp::RankedEntry;
use serde::Serialize;

/// Outcome of looking a domain up in one surface's ranked list.
///
/// `position` is `Some` exactly when `cited` is true — constructed only
/// through [`find_rank`], which upholds that pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankMatch {
    pub cited: bool,
    pub position: Option<i32>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

impl RankMatch {
    /// The no-match outcome: not cited, every field absent.
    #[must_use]
    pub fn not_cited() -> Self {
        Self::default()
    }
}

/// Finds the first entry whose URL contains `domain` and returns its 1-based
/// position.
///
/// Matching is plain substring containment, preserved from the system this
/// replaces. It can false-positive on unrelated hosts sharing the substring
/// (e.g. "hypefresh.co" inside "nothypefresh.co.uk"); callers wanting
/// stricter semantics should pass a more qualified needle.
///
/// An empty list yields [`RankMatch::not_cited`]; this function never fails.
#[must_use]
pub fn find_rank(entries: &[RankedEntry], domain: &str) -> RankMatch {
    for (index, entry) in entries.iter().enumerate() {
        if entry.url.contains(domain) {
            return RankMatch {
                cited: true,
                // Ranked lists are provider-capped well below i32::MAX.
                position: Some(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                url: Some(entry.url.clone()),
                title: entry.title.clone(),
                snippet: entry.snippet.clone(),
            };
        }
    }

    RankMatch::not_cited()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> RankedEntry {
        RankedEntry {
            url: url.to_string(),
            title: Some(format!("title for {url}")),
            snippet: Some(format!("snippet for {url}")),
        }
    }

    #[test]
    fn empty_list_is_not_cited() {
        let result = find_rank(&[], "hypefresh.co");
        assert_eq!(result, RankMatch::not_cited());
        assert!(!result.cited);
        assert!(result.position.is_none());
    }

    #[test]
    fn position_is_one_based() {
        let entries = vec![entry("https://a.example"), entry("https://hypefresh.co/x")];
        let result = find_rank(&entries, "hypefresh.co");
        assert!(result.cited);
        assert_eq!(result.position, Some(2));
        assert_eq!(result.url.as_deref(), Some("https://hypefresh.co/x"));
    }

    #[test]
    fn first_match_wins() {
        let entries = vec![
            entry("https://other.example"),
            entry("https://hypefresh.co/first"),
            entry("https://hypefresh.co/second"),
        ];
        let result = find_rank(&entries, "hypefresh.co");
        assert_eq!(result.position, Some(2));
        assert_eq!(result.url.as_deref(), Some("https://hypefresh.co/first"));
    }

    #[test]
    fn no_earlier_entry_matches_the_reported_position() {
        let entries = vec![
            entry("https://one.example"),
            entry("https://two.example"),
            entry("https://hypefresh.co"),
        ];
        let result = find_rank(&entries, "hypefresh.co");
        let position = result.position.unwrap() as usize;
        for earlier in &entries[..position - 1] {
            assert!(!earlier.url.contains("hypefresh.co"));
        }
        assert!(entries[position - 1].url.contains("hypefresh.co"));
    }

    #[test]
    fn cited_iff_position_present() {
        for domain in ["hypefresh.co", "absent.example"] {
            let entries = vec![entry("https://hypefresh.co")];
            let result = find_rank(&entries, domain);
            assert_eq!(result.cited, result.position.is_some());
        }
    }

    #[test]
    fn no_match_leaves_all_fields_absent() {
        let entries = vec![entry("https://a.example"), entry("https://b.example")];
        let result = find_rank(&entries, "hypefresh.co");
        assert!(!result.cited);
        assert!(result.position.is_none());
        assert!(result.url.is_none());
        assert!(result.title.is_none());
        assert!(result.snippet.is_none());
    }

    #[test]
    fn entries_with_empty_urls_are_skipped() {
        let entries = vec![
            RankedEntry {
                url: String::new(),
                title: None,
                snippet: None,
            },
            entry("https://hypefresh.co"),
        ];
        let result = find_rank(&entries, "hypefresh.co");
        assert_eq!(result.position, Some(2));
    }

    #[test]
    fn substring_containment_matches_unrelated_superstrings() {
        // Documented limitation of substring matching, preserved from the
        // system this replaces.
        let entries = vec![entry("https://nothypefresh.co.uk/page")];
        let result = find_rank(&entries, "hypefresh.co");
        assert!(result.cited);
        assert_eq!(result.position, Some(1));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let entries = vec![entry("https://HYPEFRESH.CO")];
        let result = find_rank(&entries, "hypefresh.co");
        assert!(!result.cited);
    }
}
