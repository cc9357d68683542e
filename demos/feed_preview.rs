//! Feed preview
//!
//! Fetches the configured feeds over HTTP and prints which entries the
//! keyword filter would keep. Sends nothing and records nothing.
//!
//! ```bash
//! cargo run --bin feed_preview
//! NEWSRELAY_FEEDS=https://olhardigital.com.br/feed/ NEWSRELAY_KEYWORDS=nasa,ia cargo run --bin feed_preview
//! ```

use newsrelay_core::config::{DEFAULT_FEEDS, DEFAULT_KEYWORDS};
use newsrelay_core::filter::filter_entries;
use newsrelay_core::traits::{FeedSource, FetchOutcome};
use newsrelay_core::KeywordSet;
use newsrelay_feed_http::HttpFeedSource;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

fn list_from_env(key: &str, defaults: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let feeds = list_from_env("NEWSRELAY_FEEDS", DEFAULT_FEEDS);
    let keywords = KeywordSet::new(list_from_env("NEWSRELAY_KEYWORDS", DEFAULT_KEYWORDS));
    let source = HttpFeedSource::with_timeout(Duration::from_secs(15));
    let nothing_sent = HashSet::new();

    for url in &feeds {
        info!("🔎 Checking feed: {}", url);

        let entries = match source.fetch(url).await {
            FetchOutcome::Fetched(entries) => entries,
            FetchOutcome::Failed { reason } => {
                warn!("❌ {}: {}", url, reason);
                continue;
            }
        };

        let result = filter_entries(entries, &nothing_sent, &keywords);
        for candidate in &result.accepted {
            let keyword = keywords.first_match(&candidate.title).unwrap_or_default();
            println!("  [{}] {}\n      {}", keyword, candidate.title, candidate.link);
        }
        println!(
            "  {} of {} entries match\n",
            result.stats.accepted, result.stats.seen
        );
    }
}
