//! Minimal embedding example for newsrelay-core
//!
//! Drives one relay run with in-process collaborators: a canned feed
//! source, a notifier that prints to stdout and an in-memory link store.
//! Nothing touches the network or the filesystem.

use newsrelay_core::config::{EngineConfig, LinkStoreConfig, RelayConfig, TelegramConfig};
use newsrelay_core::traits::{DeliveryOutcome, FeedEntry, FeedSource, FetchOutcome, Notifier};
use newsrelay_core::{MemoryLinkStore, RelayEngine, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

const TECH_FEED: &str = "https://tech.example/rss";
const SCIENCE_FEED: &str = "https://science.example/rss";

/// Feed source serving fixed entries
struct EmbeddedFeedSource;

#[async_trait::async_trait]
impl FeedSource for EmbeddedFeedSource {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        match url {
            TECH_FEED => FetchOutcome::Fetched(vec![
                FeedEntry::new("AMD launches chip", "https://tech.example/1"),
                FeedEntry::new("Random gossip", "https://tech.example/2"),
                FeedEntry::new("Nvidia and Intel team up", "https://tech.example/3"),
            ]),
            SCIENCE_FEED => FetchOutcome::Fetched(vec![
                FeedEntry::new("NASA update", "https://science.example/1"),
                // Same story syndicated from the tech feed
                FeedEntry::new("Nvidia and Intel team up", "https://tech.example/3"),
            ]),
            _ => FetchOutcome::failed("unknown feed"),
        }
    }

    fn source_name(&self) -> &'static str {
        "embedded"
    }
}

/// Notifier printing messages instead of sending them
struct PrintingNotifier {
    sent: AtomicUsize,
}

#[async_trait::async_trait]
impl Notifier for PrintingNotifier {
    async fn send(&self, message: &str) -> DeliveryOutcome {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[Embedded] message #{}:\n{}\n", n, message);
        DeliveryOutcome::Delivered
    }

    fn notifier_name(&self) -> &'static str {
        "stdout"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== Embedded newsrelay-core Example ===\n");

    // The first story was delivered by an earlier run
    let store = MemoryLinkStore::with_links(["https://tech.example/1"]);

    let config = RelayConfig::new(TelegramConfig::new("demo-token", "demo-chat"))
        .with_feeds([TECH_FEED, SCIENCE_FEED])
        .with_keywords(["amd", "nvidia", "nasa"])
        .with_link_store(LinkStoreConfig::Memory)
        .with_engine(EngineConfig {
            event_channel_capacity: 100,
            shuffle_seed: Some(7),
            ..EngineConfig::default()
        });

    println!("1. Creating engine...");
    let (engine, mut event_rx) = RelayEngine::new(
        Box::new(EmbeddedFeedSource),
        Box::new(PrintingNotifier {
            sent: AtomicUsize::new(0),
        }),
        Box::new(store.clone()),
        config,
    )?;

    println!("2. Running once...\n");
    let report = engine.run().await?;

    println!("3. Events:");
    while let Ok(event) = event_rx.try_recv() {
        println!("[Event] {:?}", event);
    }

    println!("\n4. Report: {}/{} delivered, {} duplicate(s) dropped", report.delivered, report.total, report.duplicates);
    println!("   Link store now holds: {:?}", store.recorded().await);

    println!("\n5. Running again with the same feeds...");
    let (engine, _events) = RelayEngine::new(
        Box::new(EmbeddedFeedSource),
        Box::new(PrintingNotifier {
            sent: AtomicUsize::new(0),
        }),
        Box::new(store.clone()),
        RelayConfig::new(TelegramConfig::new("demo-token", "demo-chat"))
            .with_feeds([TECH_FEED, SCIENCE_FEED])
            .with_keywords(["amd", "nvidia", "nasa"])
            .with_link_store(LinkStoreConfig::Memory),
    )?;
    let report = engine.run().await?;
    println!("   {}/{} delivered (nothing new)", report.delivered, report.total);

    println!("\n=== Embedding Successful ===");
    Ok(())
}
