//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{ChatClient, SlackError};
use crate::models::{ChannelId, MessageTs};

pub const DEFAULT_API_BASE: &str = "https://slack.com/api/";

/// `chat.postMessage` request body.
#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

/// `reactions.add` request body.
#[derive(Debug, Serialize)]
struct AddReactionRequest<'a> {
    channel: &'a str,
    name: &'a str,
    timestamp: &'a str,
}

/// The envelope every Web API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Web API client authenticated with a bot token.
pub struct SlackClient {
    client: Client,
    api_base: Url,
    bot_token: Option<String>,
}

impl SlackClient {
    /// Create a client against `api_base` (normally [`DEFAULT_API_BASE`]).
    ///
    /// A missing token is allowed; every call then fails with
    /// [`SlackError::MissingToken`].
    pub fn new(
        api_base: &str,
        bot_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SlackError> {
        let mut base = api_base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("setbot/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base,
            bot_token: bot_token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn call<T: Serialize + ?Sized>(&self, method: &str, payload: &T) -> Result<(), SlackError> {
        let token = self.bot_token.as_deref().ok_or(SlackError::MissingToken)?;
        let url = self.api_base.join(method)?;

        debug!("Calling Slack {}", method);
        let response: ApiResponse = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(SlackError::Api {
                method: method.to_string(),
                error: response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_ts: Option<&MessageTs>,
    ) -> Result<(), SlackError> {
        let request = PostMessageRequest {
            channel: channel.as_str(),
            text,
            thread_ts: thread_ts.map(|ts| ts.as_str()),
        };
        self.call("chat.postMessage", &request).await
    }

    async fn add_reaction(
        &self,
        channel: &ChannelId,
        name: &str,
        timestamp: &MessageTs,
    ) -> Result<(), SlackError> {
        let request = AddReactionRequest {
            channel: channel.as_str(),
            name,
            timestamp: timestamp.as_str(),
        };
        self.call("reactions.add", &request).await
    }
}
