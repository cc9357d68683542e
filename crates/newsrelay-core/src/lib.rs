// # newsrelay-core
//
// Core library for the newsrelay feed-to-chat pipeline.
//
// ## Architecture Overview
//
// One run of the pipeline polls a fixed list of feeds, keeps the entries
// that are both new and relevant, and delivers them one by one to a chat:
// - **FeedSource**: Trait for fetching and parsing a feed into entries
// - **Notifier**: Trait for delivering one formatted message
// - **LinkStore**: Trait for the append-only record of delivered links
// - **RelayEngine**: Orchestrates load → fetch/filter → shuffle → deliver
// - **KeywordSet** / [`filter`]: Pure relevance filtering against a snapshot
//
// ## Delivery Guarantees
//
// 1. **At-most-once per link**: A link is recorded right after its own
//    delivery succeeds, before the next dispatch starts
// 2. **Failure isolation**: A broken feed or a failed send never aborts
//    the run
// 3. **Fatal only on configuration**: Missing credentials stop the run
//    before any feed is touched

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod filter;
pub mod message;
pub mod store;

// Re-export core types for convenience
pub use traits::{FeedSource, Notifier, LinkStore};
pub use engine::{RelayEngine, RunReport};
pub use config::{RelayConfig, TelegramConfig, LinkStoreConfig};
pub use error::{Error, Result};
pub use filter::{Candidate, KeywordSet};
pub use store::{MemoryLinkStore, FileLinkStore};
