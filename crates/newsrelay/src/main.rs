// # newsrelay - RSS keyword relay
//
// One invocation performs one run:
// 1. Read configuration from environment variables
// 2. Refuse to start without Telegram credentials
// 3. Wire the HTTP feed source, Telegram notifier and links file
// 4. Run the relay engine once and exit
//
// Scheduling (cron, systemd timer) is left to the host.
//
// ## Configuration
//
// ### Telegram
// - `TELEGRAM_BOT_TOKEN`: Bot API token (required)
// - `TELEGRAM_CHAT_ID`: Destination chat (required)
// - `TELEGRAM_API_BASE`: Bot API base URL
//
// ### Relay
// - `NEWSRELAY_FEEDS`: Comma-separated feed URLs (built-in list if unset)
// - `NEWSRELAY_KEYWORDS`: Comma-separated keywords (built-in list if unset)
// - `NEWSRELAY_LINKS_PATH`: Delivered-links file (default: sent_links.txt)
// - `NEWSRELAY_SHUFFLE_SEED`: Fixed shuffle seed
// - `NEWSRELAY_HTTP_TIMEOUT_SECS`: Timeout for feed and Bot API requests
// - `NEWSRELAY_MODE`: `live` (default) or `dry-run`
// - `NEWSRELAY_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export TELEGRAM_BOT_TOKEN=123456:ABC...
// export TELEGRAM_CHAT_ID=-1001234567890
// export NEWSRELAY_LINKS_PATH=/var/lib/newsrelay/sent_links.txt
//
// newsrelay
// ```

use anyhow::Result;
use newsrelay_core::config::{EngineConfig, LinkStoreConfig, RelayConfig, TelegramConfig};
use newsrelay_core::store::{FileLinkStore, MemoryLinkStore};
use newsrelay_core::traits::LinkStore;
use newsrelay_core::{RelayEngine, RunReport};
use newsrelay_feed_http::HttpFeedSource;
use newsrelay_notifier_telegram::TelegramNotifier;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (individual feed or delivery failures included)
/// - 1: Configuration error, including missing credentials
/// - 2: Runtime error (unreadable links file, runtime failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayExitCode {
    /// Run completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<RelayExitCode> for ExitCode {
    fn from(code: RelayExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// How deliveries are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Send messages and append to the links file
    Live,
    /// Log messages, never write the links file
    DryRun,
}

/// Application configuration
#[derive(Debug)]
struct Config {
    telegram: TelegramConfig,
    feeds: Option<Vec<String>>,
    keywords: Option<Vec<String>>,
    links_path: String,
    shuffle_seed: Option<u64>,
    http_timeout_secs: Option<u64>,
    mode: Mode,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut telegram = TelegramConfig::new(
            lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            lookup("TELEGRAM_CHAT_ID").unwrap_or_default(),
        );
        if let Some(api_base) = lookup("TELEGRAM_API_BASE").filter(|s| !s.trim().is_empty()) {
            telegram = telegram.with_api_base(api_base.trim());
        }

        let mode = match lookup("NEWSRELAY_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("live") => Mode::Live,
            Some("dry-run") | Some("dry_run") => Mode::DryRun,
            Some(other) => anyhow::bail!(
                "NEWSRELAY_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            telegram,
            feeds: lookup("NEWSRELAY_FEEDS").map(|s| parse_list(&s)),
            keywords: lookup("NEWSRELAY_KEYWORDS").map(|s| parse_list(&s)),
            links_path: lookup("NEWSRELAY_LINKS_PATH")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| newsrelay_core::config::DEFAULT_LINKS_PATH.to_string()),
            shuffle_seed: parse_number(&lookup, "NEWSRELAY_SHUFFLE_SEED")?,
            http_timeout_secs: parse_number(&lookup, "NEWSRELAY_HTTP_TIMEOUT_SECS")?,
            mode,
            log_level: lookup("NEWSRELAY_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate settings that only the binary knows about
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "NEWSRELAY_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if let Some(feeds) = &self.feeds
            && feeds.is_empty()
        {
            anyhow::bail!("NEWSRELAY_FEEDS is set but contains no URL");
        }

        Ok(())
    }

    /// Build the engine configuration
    fn relay_config(&self) -> RelayConfig {
        let mut relay = RelayConfig::new(self.telegram.clone()).with_link_store(LinkStoreConfig::File {
            path: self.links_path.clone(),
        });

        if let Some(feeds) = &self.feeds {
            relay = relay.with_feeds(feeds.iter().cloned());
        }
        if let Some(keywords) = &self.keywords {
            relay = relay.with_keywords(keywords.iter().cloned());
        }

        let defaults = EngineConfig::default();
        relay.with_engine(EngineConfig {
            shuffle_seed: self.shuffle_seed,
            http_timeout_secs: self.http_timeout_secs.unwrap_or(defaults.http_timeout_secs),
            ..defaults
        })
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse an optional numeric variable; a malformed value is an error
fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match lookup(key).filter(|s| !s.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} must be a non-negative integer. Got '{}': {}", key, raw, e)),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RelayExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return RelayExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RelayExitCode::ConfigError.into();
    }

    // Credentials and feed list are checked before anything is touched
    let relay_config = config.relay_config();
    if let Err(e) = relay_config.validate() {
        error!("❌ {}", e);
        return RelayExitCode::ConfigError.into();
    }

    // One run, everything awaited in order
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RelayExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_once(&config, relay_config).await {
            Ok(_) => RelayExitCode::Completed,
            Err(e) if e.is_config() => {
                error!("❌ {}", e);
                RelayExitCode::ConfigError
            }
            Err(e) => {
                error!("Run aborted: {}", e);
                RelayExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Wire the collaborators and run the engine once
async fn run_once(config: &Config, relay_config: RelayConfig) -> newsrelay_core::Result<RunReport> {
    // No links file or directory is created without credentials
    relay_config.validate()?;

    let timeout = Duration::from_secs(relay_config.engine.http_timeout_secs);

    let link_store = build_link_store(&config.links_path, config.mode).await?;
    let feed_source = HttpFeedSource::with_timeout(timeout);
    let notifier = TelegramNotifier::new(
        &relay_config.telegram,
        timeout,
        config.mode == Mode::DryRun,
    );

    if config.mode == Mode::DryRun {
        info!("Dry-run mode: messages are logged, {} is left untouched", config.links_path);
    }

    let (engine, events) = RelayEngine::new(
        Box::new(feed_source),
        Box::new(notifier),
        link_store,
        relay_config,
    )?;

    // Events are not consumed here, the log already covers them
    drop(events);

    engine.run().await
}

/// Open the links file, or a throwaway copy of it in dry-run mode
async fn build_link_store(path: &str, mode: Mode) -> newsrelay_core::Result<Box<dyn LinkStore>> {
    match mode {
        Mode::Live => Ok(Box::new(FileLinkStore::new(path).await?)),
        Mode::DryRun => {
            if !Path::new(path).exists() {
                return Ok(Box::new(MemoryLinkStore::new()));
            }
            let snapshot = FileLinkStore::new(path).await?.load().await?;
            Ok(Box::new(MemoryLinkStore::with_links(snapshot)))
        }
    }
}
