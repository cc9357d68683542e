//! Core relay engine
//!
//! The RelayEngine is responsible for:
//! - Loading the delivered-links snapshot from the LinkStore
//! - Fetching every configured feed via FeedSource
//! - Filtering entries for novelty and relevance
//! - Delivering candidates via Notifier, one at a time
//! - Recording each link right after its delivery succeeds
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!                  │ RelayEngine  │
//!                  └──────────────┘
//!                          │
//!     ┌────────────────────┼────────────────────┬─────────────────┐
//!     │                    │                    │                 │
//!     ▼                    ▼                    ▼                 ▼
//! ┌───────────┐     ┌─────────────┐      ┌────────────┐    ┌────────────┐
//! │ LinkStore │     │ FeedSource  │      │  Notifier  │    │   Events   │
//! │ (load,    │     │ (fetch)     │      │  (send)    │    │  (notify)  │
//! │  record)  │     └─────────────┘      └────────────┘    └────────────┘
//! └───────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Check credentials (fatal if missing, nothing else happens)
//! 2. Load the LinkStore snapshot
//! 3. Fetch + filter each feed in order, dropping links already queued
//! 4. Shuffle the candidates
//! 5. For each candidate: send, then record on success
//! 6. Report delivered/total

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::config::{RelayConfig, TelegramConfig};
use crate::error::Result;
use crate::filter::{Candidate, FilterStats, KeywordSet, RejectReason, filter_entries};
use crate::message::format_message;
use crate::traits::{DeliveryOutcome, FeedSource, FetchOutcome, LinkStore, Notifier};

/// Events emitted by the RelayEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started with the loaded snapshot
    Started {
        feeds_count: usize,
        known_links: usize,
    },

    /// Feed fetched and parsed
    FeedFetched {
        url: String,
        entries: usize,
    },

    /// Feed could not be fetched or parsed
    FeedFailed {
        url: String,
        reason: String,
    },

    /// Entry queued for delivery
    EntryAccepted {
        title: String,
        link: String,
    },

    /// Entry dropped by the filter
    EntryRejected {
        link: String,
        reason: RejectReason,
    },

    /// Entry dropped because an earlier feed already queued the same link
    DuplicateDropped {
        link: String,
    },

    /// Message confirmed and link recorded
    DeliverySucceeded {
        link: String,
    },

    /// Message not confirmed; link left eligible for the next run
    DeliveryFailed {
        link: String,
        reason: String,
    },

    /// Message confirmed but the link could not be recorded
    RecordFailed {
        link: String,
        error: String,
    },

    /// Run finished
    Finished {
        delivered: usize,
        total: usize,
    },
}

/// Outcome counters for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Links in the snapshot loaded at run start
    pub known_links: usize,
    pub feeds_checked: usize,
    pub feeds_failed: usize,
    /// Filter counters summed over all feeds
    pub filter: FilterStats,
    /// Accepted entries dropped because another feed queued the same link
    pub duplicates: usize,
    /// Candidates queued for delivery
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Delivered, but the link store append failed
    pub unrecorded: usize,
}

impl RunReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            known_links: 0,
            feeds_checked: 0,
            feeds_failed: 0,
            filter: FilterStats::default(),
            duplicates: 0,
            total: 0,
            delivered: 0,
            failed: 0,
            unrecorded: 0,
        }
    }

    /// Run duration
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }
}

/// Core relay engine
///
/// ## Lifecycle
///
/// 1. Create with [`RelayEngine::new()`]
/// 2. Call [`RelayEngine::run()`] once
/// 3. Drop
///
/// ## Ordering
///
/// Everything is awaited in sequence. A link is appended to the store
/// after its own send completed and before the next send starts, so a
/// crash re-delivers at most the message in flight.
pub struct RelayEngine {
    /// Feed source for fetching entries
    feed_source: Box<dyn FeedSource>,

    /// Notifier for delivering messages
    notifier: Box<dyn Notifier>,

    /// Link store for deduplication across runs
    link_store: Box<dyn LinkStore>,

    /// Feed URLs, in polling order
    feeds: Vec<String>,

    /// Normalized title keywords
    keywords: KeywordSet,

    /// Destination credentials, re-checked at run start
    telegram: TelegramConfig,

    /// Fixed shuffle seed (reproducible runs)
    shuffle_seed: Option<u64>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl RelayEngine {
    /// Create a new relay engine
    ///
    /// # Parameters
    ///
    /// - `feed_source`: Feed source implementation
    /// - `notifier`: Notifier implementation
    /// - `link_store`: Link store implementation
    /// - `config`: Relay configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Fails with [`Error::MissingCredential`](crate::Error::MissingCredential)
    /// when the bot token or chat id is absent; no collaborator is called.
    pub fn new(
        feed_source: Box<dyn FeedSource>,
        notifier: Box<dyn Notifier>,
        link_store: Box<dyn LinkStore>,
        config: RelayConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            feed_source,
            notifier,
            link_store,
            keywords: KeywordSet::new(&config.keywords),
            feeds: config.feeds,
            telegram: config.telegram,
            shuffle_seed: config.engine.shuffle_seed,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the pipeline once
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: The run completed, possibly with per-feed or
    ///   per-item failures recorded in the report
    /// - `Err(Error)`: Fatal condition (missing credentials, unreadable
    ///   link store); nothing was delivered
    pub async fn run(&self) -> Result<RunReport> {
        self.telegram.validate()?;
        let mut report = RunReport::new();

        info!(
            "🚀 Relay run started ({} feeds, {} keywords)",
            self.feeds.len(),
            self.keywords.len()
        );

        let sent = self.link_store.load().await?;
        info!("🧠 Memory loaded with {} links", sent.len());

        report.known_links = sent.len();

        self.emit_event(EngineEvent::Started {
            feeds_count: self.feeds.len(),
            known_links: sent.len(),
        });

        let mut candidates = self.collect_candidates(&sent, &mut report).await;
        report.total = candidates.len();

        if candidates.is_empty() {
            info!("✅ No new relevant entries this time. Done.");
            return Ok(self.finish(report));
        }

        shuffle_candidates(&mut candidates, self.shuffle_seed);
        info!(
            "📬 {} entries to deliver via {}. Starting dispatch...",
            candidates.len(),
            self.notifier.notifier_name()
        );

        for candidate in &candidates {
            self.deliver(candidate, &mut report).await;
        }

        Ok(self.finish(report))
    }

    /// Fetch and filter every feed against the same snapshot
    async fn collect_candidates(
        &self,
        sent: &HashSet<String>,
        report: &mut RunReport,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut queued: HashSet<String> = HashSet::new();

        for url in &self.feeds {
            info!("🔎 Checking feed: {}", url);
            report.feeds_checked += 1;

            let entries = match self.feed_source.fetch(url).await {
                FetchOutcome::Fetched(entries) => {
                    debug!("Feed {} returned {} entries", url, entries.len());
                    self.emit_event(EngineEvent::FeedFetched {
                        url: url.clone(),
                        entries: entries.len(),
                    });
                    entries
                }
                FetchOutcome::Failed { reason } => {
                    warn!("❌ Failed to process feed {}: {}", url, reason);
                    report.feeds_failed += 1;
                    self.emit_event(EngineEvent::FeedFailed {
                        url: url.clone(),
                        reason,
                    });
                    continue;
                }
            };

            let result = filter_entries(entries, sent, &self.keywords);
            report.filter += result.stats;

            for rejection in result.rejected {
                debug!(
                    "❌ Entry ignored ({}): {}",
                    rejection.reason, rejection.entry.title
                );
                self.emit_event(EngineEvent::EntryRejected {
                    link: rejection.entry.link,
                    reason: rejection.reason,
                });
            }

            for candidate in result.accepted {
                if !queued.insert(candidate.link.clone()) {
                    debug!("Duplicate link already queued this run: {}", candidate.link);
                    report.duplicates += 1;
                    self.emit_event(EngineEvent::DuplicateDropped {
                        link: candidate.link,
                    });
                    continue;
                }

                info!("✅ Relevant entry found: {}", candidate.title);
                self.emit_event(EngineEvent::EntryAccepted {
                    title: candidate.title.clone(),
                    link: candidate.link.clone(),
                });
                candidates.push(candidate);
            }
        }

        candidates
    }

    /// Send one candidate and record it on success
    async fn deliver(&self, candidate: &Candidate, report: &mut RunReport) {
        let message = format_message(candidate);

        match self.notifier.send(&message).await {
            DeliveryOutcome::Delivered => {
                report.delivered += 1;
                info!("📤 Message sent: {}", candidate.link);

                match self.link_store.record(&candidate.link).await {
                    Ok(()) => {
                        self.emit_event(EngineEvent::DeliverySucceeded {
                            link: candidate.link.clone(),
                        });
                    }
                    Err(e) => {
                        error!(
                            "Delivered {} but failed to record it; it may be sent again next run: {}",
                            candidate.link, e
                        );
                        report.unrecorded += 1;
                        self.emit_event(EngineEvent::RecordFailed {
                            link: candidate.link.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
            DeliveryOutcome::Failed { reason } => {
                warn!("❌ Failed to deliver {}: {}", candidate.link, reason);
                report.failed += 1;
                self.emit_event(EngineEvent::DeliveryFailed {
                    link: candidate.link.clone(),
                    reason,
                });
            }
        }
    }

    fn finish(&self, mut report: RunReport) -> RunReport {
        report.finished_at = Utc::now();

        info!(
            "🏁 Run finished: {}/{} delivered ({} failed, {} feeds failed, {}ms)",
            report.delivered,
            report.total,
            report.failed,
            report.feeds_failed,
            report.elapsed().num_milliseconds()
        );
        if report.unrecorded > 0 {
            warn!("{} delivered links could not be recorded", report.unrecorded);
        }

        self.emit_event(EngineEvent::Finished {
            delivered: report.delivered,
            total: report.total,
        });
        report
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Uniformly permute the candidates
fn shuffle_candidates(candidates: &mut [Candidate], seed: Option<u64>) {
    match seed {
        Some(seed) => candidates.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => candidates.shuffle(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("t{}", i), format!("https://a/{}", i)))
            .collect()
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut a = candidates(20);
        let mut b = candidates(20);
        shuffle_candidates(&mut a, Some(7));
        shuffle_candidates(&mut b, Some(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let original = candidates(20);
        let mut shuffled = original.clone();
        shuffle_candidates(&mut shuffled, None);

        let before: HashSet<_> = original.iter().collect();
        let after: HashSet<_> = shuffled.iter().collect();
        assert_eq!(shuffled.len(), original.len());
        assert_eq!(before, after);
    }

    #[test]
    fn test_report_elapsed() {
        let mut report = RunReport::new();
        report.finished_at = report.started_at + chrono::Duration::milliseconds(5);
        assert_eq!(report.elapsed().num_milliseconds(), 5);
    }
}
