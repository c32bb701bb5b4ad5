//! Slack integration.
//!
//! - **client**: outbound Web API calls (`chat.postMessage`, `reactions.add`)
//! - **events**: inbound Events API payloads
//! - **signature**: request signing verification for the events endpoint

pub mod client;
pub mod events;
pub mod signature;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ChannelId, MessageTs};

pub use client::SlackClient;

/// Errors from outbound chat calls.
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Slack {method} failed: {error}")]
    Api { method: String, error: String },

    #[error("No bot token configured")]
    MissingToken,
}

/// The chat operations the bot needs.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &'static str;

    /// Post `text` to `channel`, as a thread reply when `thread_ts` is set.
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_ts: Option<&MessageTs>,
    ) -> Result<(), SlackError>;

    /// Attach the emoji `name` to the message at `timestamp`.
    async fn add_reaction(
        &self,
        channel: &ChannelId,
        name: &str,
        timestamp: &MessageTs,
    ) -> Result<(), SlackError>;
}

/// A call captured by [`RecordingChatClient`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Message {
        channel: String,
        text: String,
        thread_ts: Option<String>,
    },
    Reaction {
        channel: String,
        name: String,
        timestamp: String,
    },
}

/// Test double that records every call and optionally fails or stalls them all.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingChatClient {
    calls: std::sync::Mutex<Vec<ChatCall>>,
    fail: bool,
    delay: Option<std::time::Duration>,
}

#[cfg(test)]
impl RecordingChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Each call waits `delay` before it is recorded.
    pub fn slow(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn push(&self, call: ChatCall) -> Result<(), SlackError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(SlackError::Api {
                method: "test".to_string(),
                error: "not_authed".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl ChatClient for RecordingChatClient {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_ts: Option<&MessageTs>,
    ) -> Result<(), SlackError> {
        self.push(ChatCall::Message {
            channel: channel.to_string(),
            text: text.to_string(),
            thread_ts: thread_ts.map(|ts| ts.to_string()),
        })
        .await
    }

    async fn add_reaction(
        &self,
        channel: &ChannelId,
        name: &str,
        timestamp: &MessageTs,
    ) -> Result<(), SlackError> {
        self.push(ChatCall::Reaction {
            channel: channel.to_string(),
            name: name.to_string(),
            timestamp: timestamp.to_string(),
        })
        .await
    }
}
