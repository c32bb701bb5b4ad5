//! Message handling.
//!
//! One call per inbound message event. A message can record a set time,
//! earn a celebration for a sub-minute set, and ask for the leaderboard,
//! all at once. Handling is split in two steps: [`EventHandler::apply_message`]
//! does the score bookkeeping under a single lock and returns the chat calls
//! owed as [`Replies`]; [`EventHandler::send_replies`] makes them, logging
//! failures. The webhook runs the second step in the background.

pub mod clock;
pub mod compliments;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::leaderboard::{format_leaderboard, Leaderboard, RankedEntry};
use crate::models::{find_match, ChannelId, MessageTs, UserId};
use crate::slack::events::MessageEvent;
use crate::slack::ChatClient;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compliments::Compliments;

/// Word that asks the bot to post the standings.
pub const LEADERBOARD_KEYWORD: &str = "leaderboard";

/// Errors that stop a single event from being handled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Message event is missing `{0}`")]
    MissingField(&'static str),
}

/// Tunables for [`EventHandler`].
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Sets strictly faster than this earn a celebration.
    pub celebration_threshold_seconds: f64,
    /// Emoji added to a celebrated message.
    pub celebration_reaction: String,
    /// Number of places shown on the leaderboard.
    pub top_n: usize,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            celebration_threshold_seconds: 60.0,
            celebration_reaction: "fire".to_string(),
            top_n: 3,
        }
    }
}

/// What the handler did with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Edited, bot or other non-plain message.
    Ignored,
    Handled {
        /// Seconds recorded for the author, if the message had a set time.
        score: Option<f64>,
        celebrated: bool,
        leaderboard_posted: bool,
    },
}

/// Today's standings, as served by the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct Standings {
    pub date: NaiveDate,
    pub timezone: String,
    pub entries: Vec<RankedEntry>,
}

/// Chat calls owed for one handled message.
#[derive(Debug, Clone, PartialEq)]
pub struct Replies {
    channel: ChannelId,
    ts: MessageTs,
    user: UserId,
    celebrate: bool,
    leaderboard: Option<Vec<RankedEntry>>,
}

impl Replies {
    pub fn is_empty(&self) -> bool {
        !self.celebrate && self.leaderboard.is_none()
    }
}

/// The fields a plain message must carry.
struct PlainMessage<'a> {
    text: &'a str,
    user: &'a UserId,
    channel: &'a ChannelId,
    ts: &'a MessageTs,
}

impl<'a> PlainMessage<'a> {
    fn from_event(event: &'a MessageEvent) -> Result<Self, HandlerError> {
        Ok(Self {
            text: event
                .text
                .as_deref()
                .ok_or(HandlerError::MissingField("text"))?,
            user: event.user.as_ref().ok_or(HandlerError::MissingField("user"))?,
            channel: event
                .channel
                .as_ref()
                .ok_or(HandlerError::MissingField("channel"))?,
            ts: event.ts.as_ref().ok_or(HandlerError::MissingField("ts"))?,
        })
    }
}

pub struct EventHandler {
    leaderboard: Arc<Mutex<Leaderboard>>,
    chat: Arc<dyn ChatClient>,
    clock: Arc<dyn Clock>,
    compliments: Compliments,
    settings: HandlerSettings,
}

impl EventHandler {
    pub fn new(
        leaderboard: Arc<Mutex<Leaderboard>>,
        chat: Arc<dyn ChatClient>,
        clock: Arc<dyn Clock>,
        compliments: Compliments,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            leaderboard,
            chat,
            clock,
            compliments,
            settings,
        }
    }

    pub fn leaderboard(&self) -> &Arc<Mutex<Leaderboard>> {
        &self.leaderboard
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// Handle one message event, making its chat calls before returning.
    pub async fn handle_message(&self, event: &MessageEvent) -> Result<Outcome, HandlerError> {
        let (outcome, replies) = self.apply_message(event).await?;
        if let Some(replies) = replies {
            self.send_replies(&replies).await;
        }
        Ok(outcome)
    }

    /// Record what `event` changes on the board and work out the replies it
    /// earns, without making any chat call.
    pub async fn apply_message(
        &self,
        event: &MessageEvent,
    ) -> Result<(Outcome, Option<Replies>), HandlerError> {
        debug!("Handling a message");
        if !event.is_plain() {
            debug!(subtype = ?event.subtype, "Ignoring non-plain message");
            return Ok((Outcome::Ignored, None));
        }

        let message = PlainMessage::from_event(event)?;
        let text = message.text.to_lowercase();
        let score_match = find_match(&text);
        let wants_leaderboard = text.contains(LEADERBOARD_KEYWORD);

        let (score, ranked) = {
            let mut board = self.leaderboard.lock().await;
            board.maybe_roll_over(self.clock.now());

            let score = score_match.map(|m| {
                debug!("Found a set score in the message ({})", m.text);
                let seconds = m.to_seconds();
                board.record(message.user.clone(), seconds);
                info!(user = %message.user, seconds, "Recorded set time");
                seconds
            });

            let ranked = wants_leaderboard.then(|| board.rank_top(self.settings.top_n));
            (score, ranked)
        };

        let celebrated = score.is_some_and(|s| s < self.settings.celebration_threshold_seconds);
        let outcome = Outcome::Handled {
            score,
            celebrated,
            leaderboard_posted: ranked.is_some(),
        };
        let replies = Replies {
            channel: message.channel.clone(),
            ts: message.ts.clone(),
            user: message.user.clone(),
            celebrate: celebrated,
            leaderboard: ranked,
        };

        debug!("Handled the message");
        Ok((outcome, (!replies.is_empty()).then_some(replies)))
    }

    /// Make the chat calls in `replies`. Each is tried once.
    pub async fn send_replies(&self, replies: &Replies) {
        if replies.celebrate {
            self.celebrate(replies).await;
        }
        if let Some(ranked) = &replies.leaderboard {
            self.post_leaderboard(&replies.channel, ranked).await;
        }
    }

    /// Today's standings after a rollover check.
    pub async fn standings(&self) -> Standings {
        let mut board = self.leaderboard.lock().await;
        board.maybe_roll_over(self.clock.now());
        Standings {
            date: board.current_day(),
            timezone: board.timezone().name().to_string(),
            entries: board.rank_top(self.settings.top_n),
        }
    }

    async fn celebrate(&self, replies: &Replies) {
        match self
            .chat
            .add_reaction(&replies.channel, &self.settings.celebration_reaction, &replies.ts)
            .await
        {
            Ok(()) => info!("Added a {} emoji reaction", self.settings.celebration_reaction),
            Err(e) => error!(client = self.chat.name(), "Failed to add reaction: {}", e),
        }

        let reply = self.compliments.pick_for(&replies.user);
        match self
            .chat
            .post_message(&replies.channel, &reply, Some(&replies.ts))
            .await
        {
            Ok(()) => info!("Replied with a compliment"),
            Err(e) => error!(client = self.chat.name(), "Failed to post compliment: {}", e),
        }
    }

    async fn post_leaderboard(&self, channel: &ChannelId, ranked: &[RankedEntry]) {
        let text = format_leaderboard(ranked);
        match self.chat.post_message(channel, &text, None).await {
            Ok(()) => info!(entries = ranked.len(), "Posted leaderboard"),
            Err(e) => error!(client = self.chat.name(), "Failed to post leaderboard: {}", e),
        }
    }
}
