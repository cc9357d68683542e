//! Core traits for newsrelay
//!
//! This module defines the abstract interfaces the engine drives.
//!
//! - [`FeedSource`]: Fetch and parse one feed
//! - [`Notifier`]: Deliver one formatted message
//! - [`LinkStore`]: Append-only record of delivered links

pub mod feed_source;
pub mod notifier;
pub mod link_store;

pub use feed_source::{FeedSource, FeedEntry, FetchOutcome};
pub use notifier::{Notifier, DeliveryOutcome};
pub use link_store::LinkStore;
