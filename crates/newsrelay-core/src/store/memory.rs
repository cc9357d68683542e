// # Memory Link Store
//
// In-memory implementation of LinkStore.
//
// ## Purpose
//
// Provides a store that doesn't persist across runs. Used by tests, the
// embedding demo, and dry-run mode, where the snapshot comes from the real
// links file but nothing may be written back.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::link_store::{LinkStore, check_storable};

/// In-memory link store implementation
///
/// Recorded links are kept in append order so tests can assert on the
/// exact sequence of writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryLinkStore {
    inner: Arc<RwLock<Vec<String>>>,
}

impl MemoryLinkStore {
    /// Create a new empty memory link store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with already delivered links
    pub fn with_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(RwLock::new(links.into_iter().map(Into::into).collect())),
        }
    }

    /// Links in the order they were recorded (seed first)
    pub async fn recorded(&self) -> Vec<String> {
        self.inner.read().await.clone()
    }

    /// Get the number of recorded lines
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn load(&self) -> Result<HashSet<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.iter().cloned().collect())
    }

    async fn record(&self, link: &str) -> Result<(), Error> {
        check_storable(link)?;
        self.inner.write().await.push(link.to_string());
        Ok(())
    }
}
