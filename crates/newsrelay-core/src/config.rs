//! Configuration types for newsrelay
//!
//! A [`RelayConfig`] is built once at startup and handed to the
//! [`RelayEngine`](crate::RelayEngine). Nothing in the pipeline reads
//! process-wide state after that.

use serde::{Deserialize, Serialize};

/// Feeds polled when no list is configured
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://www.tecmundo.com.br/feeds/rss",
    "https://www.canaltech.com.br/rss/",
    "https://agenciabrasil.ebc.com.br/rss/ultimasnoticias/feed.xml",
    "https://agenciabrasil.ebc.com.br/rss/geral/feed.xml",
    "https://feeds.folha.uol.com.br/ciencia/rss091.xml",
    "https://g1.globo.com/rss/g1/tecnologia/",
    "https://olhardigital.com.br/feed/",
];

/// Keywords matched against titles when no list is configured
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "tecnologia", "ciência", "inteligência artificial", "inovação", "uber",
    "meta", "facebook", "biometria", "anatel", "starlink", "game", "jogo",
    "videogame", "celular", "smartphone", "android", "ios", "pc", "console",
    "lua", "fórmula 1", "robô", "kindle", "samsung", "tv", "amd", "intel",
    "galaxy", "apple", "nvidia", "chatgpt", "gemini", "nasa", "ia",
    "telescópio", "microsoft",
];

/// Default Telegram Bot API endpoint
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default location of the delivered-links file
pub const DEFAULT_LINKS_PATH: &str = "sent_links.txt";

/// Main newsrelay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Feed URLs, polled in this order
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    /// Title keywords (any case; normalized by [`KeywordSet`](crate::KeywordSet))
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Destination chat credentials
    pub telegram: TelegramConfig,

    /// Where delivered links are recorded
    #[serde(default)]
    pub link_store: LinkStoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RelayConfig {
    /// Create a configuration with the built-in feeds and keywords
    pub fn new(telegram: TelegramConfig) -> Self {
        Self {
            feeds: default_feeds(),
            keywords: default_keywords(),
            telegram,
            link_store: LinkStoreConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Replace the feed list
    pub fn with_feeds<I, S>(mut self, feeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feeds = feeds.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the keyword list
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the link store
    pub fn with_link_store(mut self, link_store: LinkStoreConfig) -> Self {
        self.link_store = link_store;
        self
    }

    /// Set the engine settings
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Validate the configuration
    ///
    /// Credentials are checked first so that a run without them fails with
    /// [`Error::MissingCredential`](crate::Error::MissingCredential) no
    /// matter what else is wrong.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.telegram.validate()?;

        for feed in &self.feeds {
            if !feed.starts_with("https://") && !feed.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "Feed URL must use HTTP or HTTPS scheme. Got: {}",
                    feed
                )));
            }
        }

        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(crate::Error::config("At least one keyword is required"));
        }

        self.link_store.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Telegram destination configuration
///
/// The Debug implementation does NOT expose the bot token.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token
    pub bot_token: String,

    /// Destination chat identifier
    pub chat_id: String,

    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl TelegramConfig {
    /// Create a configuration against the public Bot API
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: default_api_base(),
        }
    }

    /// Point the client at a different Bot API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Both credentials must be present and non-blank
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.bot_token.trim().is_empty() {
            return Err(crate::Error::MissingCredential("TELEGRAM_BOT_TOKEN"));
        }
        if self.chat_id.trim().is_empty() {
            return Err(crate::Error::MissingCredential("TELEGRAM_CHAT_ID"));
        }
        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Telegram API base must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Link store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkStoreConfig {
    /// Append-only text file, one link per line
    File {
        /// Path to the links file
        path: String,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl LinkStoreConfig {
    /// Validate the link store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            LinkStoreConfig::File { path } if path.trim().is_empty() => {
                Err(crate::Error::config("Link store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for LinkStoreConfig {
    fn default() -> Self {
        LinkStoreConfig::File {
            path: DEFAULT_LINKS_PATH.to_string(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the observability event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Fixed seed for the candidate shuffle; `None` draws from the thread RNG
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// Timeout for each outbound HTTP request (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            shuffle_seed: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_feeds() -> Vec<String> {
    DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

fn default_api_base() -> String {
    DEFAULT_TELEGRAM_API_BASE.to_string()
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_http_timeout_secs() -> u64 {
    30
}
