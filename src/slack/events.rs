//! Slack Events API payloads.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::models::{ChannelId, MessageTs, UserId};

/// Outer envelope of everything POSTed to the events endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Sent once when the endpoint URL is configured.
    UrlVerification { challenge: String },

    /// A subscribed event.
    EventCallback {
        event: MessageEvent,
        #[serde(default)]
        event_id: Option<String>,
    },

    /// Rate-limit notices and anything newer we do not act on.
    #[serde(other)]
    Other,
}

/// An inner event. Only `message` events are acted on, but the envelope
/// carries whatever the app is subscribed to, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub channel: Option<ChannelId>,
    #[serde(default)]
    pub ts: Option<MessageTs>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    /// Edits, joins, bot posts and other system messages carry a subtype.
    /// Posts made with a bot token may instead only carry `bot_id`.
    pub fn is_plain(&self) -> bool {
        self.subtype.is_none() && self.bot_id.is_none()
    }
}

/// How many `event_id`s [`RecentEvents`] remembers by default.
pub const RECENT_EVENT_CAPACITY: usize = 1024;

/// The last few `event_id`s seen, oldest first, so an event Slack redelivers
/// is acted on once.
#[derive(Debug)]
pub struct RecentEvents {
    capacity: usize,
    seen: Mutex<SeenIds>,
}

#[derive(Debug, Default)]
struct SeenIds {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

impl RecentEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            seen: Mutex::new(SeenIds::default()),
        }
    }

    /// Remember `event_id`. False if it was already remembered.
    pub fn first_delivery(&self, event_id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if seen.ids.contains(event_id) {
            return false;
        }

        if seen.order.len() >= self.capacity {
            if let Some(oldest) = seen.order.pop_front() {
                seen.ids.remove(&oldest);
            }
        }
        seen.ids.insert(event_id.to_string());
        seen.order.push_back(event_id.to_string());
        true
    }
}

impl Default for RecentEvents {
    fn default() -> Self {
        Self::new(RECENT_EVENT_CAPACITY)
    }
}
