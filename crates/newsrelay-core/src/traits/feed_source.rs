// # Feed Source Trait
//
// Defines the interface for turning a feed URL into entries.
//
// ## Implementations
//
// - HTTP + feed-rs: `newsrelay-feed-http` crate
//
// ## Usage
//
// ```rust,ignore
// use newsrelay_core::traits::{FeedSource, FetchOutcome};
//
// let source = /* FeedSource implementation */;
//
// match source.fetch("https://example.com/rss").await {
//     FetchOutcome::Fetched(entries) => println!("{} entries", entries.len()),
//     FetchOutcome::Failed { reason } => eprintln!("feed failed: {}", reason),
// }
// ```

use async_trait::async_trait;

/// One article record from a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Article title as published (original case)
    pub title: String,
    /// Article link, used as the delivery key
    pub link: String,
}

impl FeedEntry {
    /// Create a new feed entry
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Result of fetching one feed
///
/// A failed feed is a value, not an error: the engine logs it and moves on
/// to the next feed with zero entries from this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Feed was fetched and parsed
    Fetched(Vec<FeedEntry>),
    /// Network, status, or parse failure
    Failed {
        /// Human-readable cause, for logs
        reason: String,
    },
}

impl FetchOutcome {
    /// Create a failed outcome
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Entries of a successful fetch; empty for a failed one
    pub fn into_entries(self) -> Vec<FeedEntry> {
        match self {
            FetchOutcome::Fetched(entries) => entries,
            FetchOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// Trait for feed source implementations
///
/// # Contract
///
/// - Never panics and never returns an error: every failure mode (DNS,
///   TLS, timeout, non-2xx status, malformed body) becomes
///   [`FetchOutcome::Failed`]
/// - Single attempt per call; no retry
/// - Entry order follows the feed document
/// - Entries without a usable link are dropped by the implementation
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`
    async fn fetch(&self, url: &str) -> FetchOutcome;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
