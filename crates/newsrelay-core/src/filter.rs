//! Relevance filtering
//!
//! Decides, per feed entry, whether it is new (link absent from the run's
//! snapshot) and relevant (lowercased title contains at least one keyword).
//!
//! [`filter_entries`] is a pure function of its inputs. The snapshot is
//! borrowed immutably, so every feed in a run is filtered against the same
//! pre-run state. Rejections are returned alongside the accepted entries
//! for logging; they never change control flow.

use std::collections::HashSet;
use std::fmt;

use crate::traits::FeedEntry;

/// Normalized, fixed set of title keywords
///
/// Keywords are trimmed and lowercased on construction; blanks and
/// duplicates are dropped. Matching is a case-insensitive substring test
/// OR-combined across all keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a keyword set from raw keywords
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect();

        Self { keywords }
    }

    /// First keyword contained in `title`, if any
    pub fn first_match(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Whether `title` contains any keyword
    pub fn matches(&self, title: &str) -> bool {
        self.first_match(title).is_some()
    }

    /// Number of distinct keywords
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Check if the set has no keywords (nothing can match)
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Iterate over the normalized keywords
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

/// A new, keyword-relevant entry queued for delivery
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Title as published
    pub title: String,
    /// Delivery key
    pub link: String,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

impl From<FeedEntry> for Candidate {
    fn from(entry: FeedEntry) -> Self {
        Self {
            link: entry.link.trim().to_string(),
            title: entry.title,
        }
    }
}

/// Why an entry was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Link is already in the link store snapshot
    AlreadySent,
    /// Title contains none of the keywords
    NoKeyword,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::AlreadySent => f.write_str("already sent"),
            RejectReason::NoKeyword => f.write_str("no keyword"),
        }
    }
}

/// An entry dropped by the filter, kept for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub entry: FeedEntry,
    pub reason: RejectReason,
}

/// Per-feed filtering counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub seen: usize,
    pub accepted: usize,
    pub already_sent: usize,
    pub no_keyword: usize,
}

impl std::ops::AddAssign for FilterStats {
    fn add_assign(&mut self, other: Self) {
        self.seen += other.seen;
        self.accepted += other.accepted;
        self.already_sent += other.already_sent;
        self.no_keyword += other.no_keyword;
    }
}

/// Output of [`filter_entries`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    /// Accepted entries, in feed order
    pub accepted: Vec<Candidate>,
    /// Dropped entries with their reason, in feed order
    pub rejected: Vec<Rejection>,
    pub stats: FilterStats,
}

/// Classify a single entry
///
/// Store membership is checked before keywords, so an already delivered
/// link is reported as [`RejectReason::AlreadySent`] even if its title
/// would also fail the keyword test. The link is compared trimmed, the
/// same form a [`Candidate`] carries into the link store.
pub fn classify(
    entry: &FeedEntry,
    sent: &HashSet<String>,
    keywords: &KeywordSet,
) -> Result<(), RejectReason> {
    if sent.contains(entry.link.trim()) {
        return Err(RejectReason::AlreadySent);
    }
    if !keywords.matches(&entry.title) {
        return Err(RejectReason::NoKeyword);
    }
    Ok(())
}

/// Keep the entries that are new and relevant
pub fn filter_entries<I>(entries: I, sent: &HashSet<String>, keywords: &KeywordSet) -> FilterResult
where
    I: IntoIterator<Item = FeedEntry>,
{
    let mut result = FilterResult::default();

    for entry in entries {
        result.stats.seen += 1;
        match classify(&entry, sent, keywords) {
            Ok(()) => {
                result.stats.accepted += 1;
                result.accepted.push(Candidate::from(entry));
            }
            Err(reason) => {
                match reason {
                    RejectReason::AlreadySent => result.stats.already_sent += 1,
                    RejectReason::NoKeyword => result.stats.no_keyword += 1,
                }
                result.rejected.push(Rejection { entry, reason });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(links: &[&str]) -> HashSet<String> {
        links.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keyword_set_normalizes() {
        let keywords = KeywordSet::new(["  AMD ", "nasa", "NASA", ""]);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords.iter().collect::<Vec<_>>(), vec!["amd", "nasa"]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let keywords = KeywordSet::new(["nasa"]);
        assert!(keywords.matches("NASA update"));
        assert!(keywords.matches("nasa update"));
        assert!(keywords.matches("NaSa update"));
        assert!(!keywords.matches("ESA update"));
    }

    #[test]
    fn test_match_is_or_combined() {
        let keywords = KeywordSet::new(["amd", "intel", "nvidia"]);
        assert!(keywords.matches("Intel cuts prices"));
        assert!(keywords.matches("Nvidia and AMD both ship"));
        assert!(!keywords.matches("Random gossip"));
    }

    #[test]
    fn test_match_is_substring() {
        let keywords = KeywordSet::new(["game"]);
        assert!(keywords.matches("Videogames are back"));
    }

    #[test]
    fn test_accented_keywords_match_uppercase_titles() {
        let keywords = KeywordSet::new(["ciência", "fórmula 1"]);
        assert!(keywords.matches("CIÊNCIA explica eclipse"));
        assert!(keywords.matches("Fórmula 1: resultado do GP"));
    }

    #[test]
    fn test_first_match_reports_keyword() {
        let keywords = KeywordSet::new(["apple", "samsung"]);
        assert_eq!(keywords.first_match("Samsung Galaxy"), Some("samsung"));
        assert_eq!(keywords.first_match("Xiaomi"), None);
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let keywords = KeywordSet::new(Vec::<String>::new());
        assert!(keywords.is_empty());
        assert!(!keywords.matches("anything"));
    }

    #[test]
    fn test_filter_example_scenario() {
        let sent = snapshot(&["https://a/1"]);
        let keywords = KeywordSet::new(["amd", "nasa"]);
        let entries = vec![
            FeedEntry::new("AMD launches chip", "https://a/1"),
            FeedEntry::new("Random gossip", "https://a/2"),
            FeedEntry::new("NASA update", "https://a/3"),
        ];

        let result = filter_entries(entries, &sent, &keywords);

        assert_eq!(result.accepted, vec![Candidate::new("NASA update", "https://a/3")]);
        assert_eq!(result.rejected.len(), 2);
        assert_eq!(result.rejected[0].entry.link, "https://a/1");
        assert_eq!(result.rejected[0].reason, RejectReason::AlreadySent);
        assert_eq!(result.rejected[1].entry.link, "https://a/2");
        assert_eq!(result.rejected[1].reason, RejectReason::NoKeyword);
        assert_eq!(
            result.stats,
            FilterStats {
                seen: 3,
                accepted: 1,
                already_sent: 1,
                no_keyword: 1,
            }
        );
    }

    #[test]
    fn test_filter_preserves_feed_order() {
        let keywords = KeywordSet::new(["tv"]);
        let entries = vec![
            FeedEntry::new("TV 3", "https://a/3"),
            FeedEntry::new("TV 1", "https://a/1"),
            FeedEntry::new("TV 2", "https://a/2"),
        ];

        let result = filter_entries(entries, &HashSet::new(), &keywords);
        let links: Vec<_> = result.accepted.iter().map(|c| c.link.as_str()).collect();
        assert_eq!(links, vec!["https://a/3", "https://a/1", "https://a/2"]);
    }

    #[test]
    fn test_filter_does_not_dedupe_within_feed() {
        // Cross-feed and in-feed duplicates are the engine's job
        let keywords = KeywordSet::new(["tv"]);
        let entries = vec![
            FeedEntry::new("TV", "https://a/1"),
            FeedEntry::new("TV again", "https://a/1"),
        ];

        let result = filter_entries(entries, &HashSet::new(), &keywords);
        assert_eq!(result.accepted.len(), 2);
    }

    #[test]
    fn test_padded_link_is_keyed_trimmed() {
        let keywords = KeywordSet::new(["nasa"]);
        let entries = vec![
            FeedEntry::new("NASA update", " https://a/1 "),
            FeedEntry::new("NASA launch", "https://a/2\t"),
        ];

        let result = filter_entries(entries.clone(), &snapshot(&[]), &keywords);
        let links: Vec<_> = result.accepted.iter().map(|c| c.link.as_str()).collect();
        assert_eq!(links, vec!["https://a/1", "https://a/2"]);

        let result = filter_entries(entries, &snapshot(&["https://a/1", "https://a/2"]), &keywords);
        assert!(result.accepted.is_empty());
        assert_eq!(result.stats.already_sent, 2);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = FilterStats::default();
        total += FilterStats {
            seen: 2,
            accepted: 1,
            already_sent: 1,
            no_keyword: 0,
        };
        total += FilterStats {
            seen: 3,
            accepted: 0,
            already_sent: 0,
            no_keyword: 3,
        };
        assert_eq!(total.seen, 5);
        assert_eq!(total.accepted, 1);
        assert_eq!(total.no_keyword, 3);
    }
}
