use thiserror::Error;

/// Telegram Bot API errors
///
/// Messages never contain the bot token: transport errors are stripped of
/// their URL before being stored here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TelegramError {
    /// Request never got a response (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Token rejected or bot not allowed in the chat
    #[error("Authentication failed: invalid bot token or bot not allowed in chat. Status: {status}")]
    Unauthorized { status: u16 },

    /// Too many messages
    #[error("Rate limit exceeded. Status: 429 - {description}")]
    RateLimited { description: String },

    /// Bot API server trouble
    #[error("Telegram server error (transient): {status} - {description}")]
    Server { status: u16, description: String },

    /// Request refused (bad chat id, message too long...)
    #[error("Telegram API rejected message: {status} - {description}")]
    Rejected { status: u16, description: String },
}

impl TelegramError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, description: impl Into<String>) -> Self {
        let description = description.into();
        match status {
            401 | 403 => Self::Unauthorized { status },
            429 => Self::RateLimited { description },
            500..=599 => Self::Server {
                status,
                description,
            },
            _ => Self::Rejected {
                status,
                description,
            },
        }
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}
