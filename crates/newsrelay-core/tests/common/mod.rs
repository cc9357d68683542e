//! Test doubles and common utilities for delivery contract tests
//!
//! These doubles count every call so tests can assert on what the engine
//! did (and did not) touch.

#![allow(dead_code)]

use newsrelay_core::config::{EngineConfig, LinkStoreConfig, RelayConfig, TelegramConfig};
use newsrelay_core::error::{Error, Result};
use newsrelay_core::store::MemoryLinkStore;
use newsrelay_core::traits::{DeliveryOutcome, FeedEntry, FeedSource, FetchOutcome, LinkStore, Notifier};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A FeedSource that serves canned outcomes per URL
pub struct ScriptedFeedSource {
    feeds: Arc<HashMap<String, FetchOutcome>>,
    /// URLs in the order they were fetched
    fetched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFeedSource {
    pub fn new() -> Self {
        Self {
            feeds: Arc::new(HashMap::new()),
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `entries` (title, link) for `url`
    pub fn with_feed(mut self, url: &str, entries: &[(&str, &str)]) -> Self {
        let entries = entries
            .iter()
            .map(|(title, link)| FeedEntry::new(*title, *link))
            .collect();
        Arc::make_mut(&mut self.feeds).insert(url.to_string(), FetchOutcome::Fetched(entries));
        self
    }

    /// Make `url` fail as if the network or parser broke
    pub fn with_failing_feed(mut self, url: &str, reason: &str) -> Self {
        Arc::make_mut(&mut self.feeds).insert(url.to_string(), FetchOutcome::failed(reason));
        self
    }

    /// Get the number of times fetch() was called
    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    /// URLs passed to fetch(), in call order
    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Create a new ScriptedFeedSource that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            feeds: Arc::clone(&other.feeds),
            fetched: Arc::clone(&other.fetched),
        }
    }
}

#[async_trait::async_trait]
impl FeedSource for ScriptedFeedSource {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.fetched.lock().unwrap().push(url.to_string());
        self.feeds
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchOutcome::failed(format!("no script for {}", url)))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A Notifier that records every message and fails on chosen calls
pub struct RecordingNotifier {
    /// 1-based call numbers that fail
    fail_on: Arc<HashSet<usize>>,
    /// Every message passed to send(), in call order
    messages: Arc<Mutex<Vec<String>>>,
    /// Link store to snapshot at each send (ordering checks)
    observed_store: Option<MemoryLinkStore>,
    /// Store size seen at the start of each send
    store_sizes: Arc<Mutex<Vec<usize>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            fail_on: Arc::new(HashSet::new()),
            messages: Arc::new(Mutex::new(Vec::new())),
            observed_store: None,
            store_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the given 1-based send calls
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = Arc::new(calls.iter().copied().collect());
        self
    }

    /// Snapshot the size of `store` each time send() starts
    pub fn observing(mut self, store: &MemoryLinkStore) -> Self {
        self.observed_store = Some(store.clone());
        self
    }

    /// Get the number of times send() was called
    pub fn send_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// Every message sent, in call order
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Links extracted from every message, in call order
    pub fn links(&self) -> Vec<String> {
        self.messages().iter().map(|m| link_of(m)).collect()
    }

    /// Store sizes observed at the start of each send
    pub fn store_sizes(&self) -> Vec<usize> {
        self.store_sizes.lock().unwrap().clone()
    }

    /// Create a new RecordingNotifier that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            fail_on: Arc::clone(&other.fail_on),
            messages: Arc::clone(&other.messages),
            observed_store: other.observed_store.clone(),
            store_sizes: Arc::clone(&other.store_sizes),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> DeliveryOutcome {
        if let Some(store) = &self.observed_store {
            let size = store.len().await;
            self.store_sizes.lock().unwrap().push(size);
        }

        let call = {
            let mut messages = self.messages.lock().unwrap();
            messages.push(message.to_string());
            messages.len()
        };

        if self.fail_on.contains(&call) {
            DeliveryOutcome::failed("transport error")
        } else {
            DeliveryOutcome::Delivered
        }
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// A LinkStore wrapper that counts calls and can refuse writes
pub struct CountingLinkStore {
    inner: MemoryLinkStore,
    load_call_count: Arc<AtomicUsize>,
    record_call_count: Arc<AtomicUsize>,
    fail_records: bool,
}

impl CountingLinkStore {
    pub fn new(inner: MemoryLinkStore) -> Self {
        Self {
            inner,
            load_call_count: Arc::new(AtomicUsize::new(0)),
            record_call_count: Arc::new(AtomicUsize::new(0)),
            fail_records: false,
        }
    }

    /// Every record() call fails (disk full, read-only volume...)
    pub fn failing_records(mut self) -> Self {
        self.fail_records = true;
        self
    }

    /// Get the number of times load() was called
    pub fn load_call_count(&self) -> usize {
        self.load_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times record() was called
    pub fn record_call_count(&self) -> usize {
        self.record_call_count.load(Ordering::SeqCst)
    }

    /// Create a new CountingLinkStore that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            load_call_count: Arc::clone(&other.load_call_count),
            record_call_count: Arc::clone(&other.record_call_count),
            fail_records: other.fail_records,
        }
    }
}

#[async_trait::async_trait]
impl LinkStore for CountingLinkStore {
    async fn load(&self) -> Result<HashSet<String>> {
        self.load_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn record(&self, link: &str) -> Result<()> {
        self.record_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_records {
            return Err(Error::link_store("read-only file system"));
        }
        self.inner.record(link).await
    }
}

/// Extract the link from a formatted message
pub fn link_of(message: &str) -> String {
    message
        .rsplit_once("🔗 ")
        .map(|(_, link)| link.to_string())
        .unwrap_or_default()
}

/// Helper to create a minimal RelayConfig for testing
pub fn minimal_config(feeds: &[&str], keywords: &[&str]) -> RelayConfig {
    RelayConfig::new(TelegramConfig::new("test-token", "test-chat"))
        .with_feeds(feeds.iter().copied())
        .with_keywords(keywords.iter().copied())
        .with_link_store(LinkStoreConfig::Memory)
        .with_engine(EngineConfig {
            event_channel_capacity: 1000,
            shuffle_seed: Some(42),
            http_timeout_secs: 5,
        })
}
