// # Telegram Notifier
//
// This crate provides the Telegram Bot API Notifier for newsrelay.
//
// ## Behavior
//
// - One `sendMessage` call per message, no retry
// - Plain text, link previews left enabled
// - Every failure is reported as `DeliveryOutcome::Failed`; the engine
//   decides what happens next (nothing is recorded)
// - Dry-run mode logs the payload and reports success without network I/O
//
// ## Security Requirements
//
// - Bot token NEVER appears in logs, Debug output or failure reasons
// - Bot token is part of the request path, so reqwest errors are stripped
//   of their URL before they are displayed
//
// ## API Reference
//
// - Bot API: https://core.telegram.org/bots/api#sendmessage
// - POST `/bot<token>/sendMessage` with JSON `{chat_id, text, ...}`

mod error;

pub use error::TelegramError;

use async_trait::async_trait;
use newsrelay_core::TelegramConfig;
use newsrelay_core::traits::{DeliveryOutcome, Notifier};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// `sendMessage` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub disable_web_page_preview: bool,
}

/// Envelope returned by every Bot API method
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram notifier
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the notifier will:
/// - Log the intended request payload
/// - **NOT** contact the Bot API
/// - Report every message as delivered
pub struct TelegramNotifier {
    /// Bot API token
    /// ⚠️ NEVER log this value
    bot_token: String,

    /// Destination chat
    chat_id: String,

    /// Bot API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, log instead of sending
    dry_run: bool,
}

// Custom Debug implementation that hides the bot token
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Parameters
    ///
    /// - `config`: Bot token, chat id and API base (validated by the caller)
    /// - `timeout`: Per-request HTTP timeout
    /// - `dry_run`: If true, log payloads instead of sending them
    pub fn new(config: &TelegramConfig, timeout: Duration, dry_run: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
            dry_run,
        }
    }

    /// Create a notifier that sends messages (default timeout)
    pub fn new_live(config: &TelegramConfig) -> Self {
        Self::new(config, DEFAULT_HTTP_TIMEOUT, false)
    }

    /// Create a notifier that only logs what it would send
    pub fn new_dry_run(config: &TelegramConfig) -> Self {
        Self::new(config, DEFAULT_HTTP_TIMEOUT, true)
    }

    /// Whether messages are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Build the `sendMessage` body for `text`
    pub fn build_payload<'a>(&'a self, text: &'a str) -> SendMessage<'a> {
        SendMessage {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: false,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    /// Send one message
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The Bot API confirmed the message
    /// - `Err(TelegramError)`: Transport failure or non-success response
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let payload = self.build_payload(text);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send message to chat {} with payload: {}",
                self.chat_id,
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(());
        }

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();

        if !status.is_success() {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(TelegramError::from_status(status.as_u16(), description));
        }

        match parsed {
            Some(ApiResponse { ok: false, description }) => Err(TelegramError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "ok=false".to_string()),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> DeliveryOutcome {
        match self.send_message(message).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::failed(e.to_string()),
        }
    }

    fn notifier_name(&self) -> &'static str {
        "telegram"
    }
}
