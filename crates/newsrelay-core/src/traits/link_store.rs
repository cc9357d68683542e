// # Link Store Trait
//
// Defines the interface for the durable record of delivered links.
//
// ## Purpose
//
// The link store is what keeps a link from being delivered twice:
// - It is read once per run into a snapshot used for filtering
// - It grows by one link right after each confirmed delivery
//
// There is no way to remove or rewrite entries.
//
// ## Implementations
//
// - File-based: one link per line, append-only
// - In-memory: tests and dry runs
//
// ## Usage
//
// ```rust
// use newsrelay_core::{LinkStore, MemoryLinkStore};
//
// #[tokio::main]
// async fn main() -> newsrelay_core::Result<()> {
//     let store = MemoryLinkStore::new();
//
//     // Snapshot at the start of a run
//     let sent = store.load().await?;
//     assert!(!sent.contains("https://example.com/a"));
//
//     // After a confirmed delivery
//     store.record("https://example.com/a").await?;
//     assert!(store.load().await?.contains("https://example.com/a"));
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::collections::HashSet;

/// Trait for link store implementations
///
/// # Ordering
///
/// The engine calls [`record`](LinkStore::record) strictly after the
/// matching delivery succeeded and before the next delivery starts. An
/// implementation must make the link durable before returning `Ok`, so a
/// crash can lose at most the record of the delivery in flight.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Read every recorded link
    ///
    /// # Returns
    ///
    /// - `Ok(HashSet)`: All recorded links (empty when nothing was recorded yet)
    /// - `Err(Error)`: The backing storage exists but cannot be read
    async fn load(&self) -> Result<HashSet<String>, crate::Error>;

    /// Durably append one delivered link
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The link is persisted
    /// - `Err(Error)`: Storage error, or the link is not storable (line
    ///   break, leading or trailing whitespace)
    async fn record(&self, link: &str) -> Result<(), crate::Error>;
}

/// Reject links that would not read back unchanged from the one-link-per-line format
pub(crate) fn check_storable(link: &str) -> Result<(), crate::Error> {
    if link.is_empty() {
        return Err(crate::Error::invalid_input("Link cannot be empty"));
    }
    if link.contains(['\n', '\r']) {
        return Err(crate::Error::invalid_input(format!(
            "Link contains a line break: {:?}",
            link
        )));
    }
    if link.trim() != link {
        return Err(crate::Error::invalid_input(format!(
            "Link has leading or trailing whitespace: {:?}",
            link
        )));
    }
    Ok(())
}
