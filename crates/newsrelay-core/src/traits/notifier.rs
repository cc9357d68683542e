// # Notifier Trait
//
// Defines the interface for delivering one message to the destination chat.
//
// ## Implementations
//
// - Telegram Bot API: `newsrelay-notifier-telegram` crate

use async_trait::async_trait;

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The endpoint confirmed the message (2xx)
    Delivered,
    /// Transport error or non-2xx response
    Failed {
        /// Human-readable cause, for logs. Must not contain secrets.
        reason: String,
    },
}

impl DeliveryOutcome {
    /// Create a failed outcome
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Whether the message was confirmed
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Trait for notifier implementations
///
/// # Contract
///
/// - Exactly one send attempt per call; retry and backoff are out of scope
/// - Failures are caught locally and returned as [`DeliveryOutcome::Failed`]
/// - Must not touch the link store; recording is owned by the engine
/// - Must not log or return credentials
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message
    ///
    /// # Parameters
    ///
    /// - `message`: Fully formatted plain-text message
    ///
    /// # Returns
    ///
    /// [`DeliveryOutcome::Delivered`] only when the endpoint confirmed it
    async fn send(&self, message: &str) -> DeliveryOutcome;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}
