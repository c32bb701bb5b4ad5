//! Daily leaderboard store.
//!
//! Holds each user's latest set time for the current day. "Today" is judged
//! in a fixed timezone rather than the server's locale, and the whole board
//! is cleared the first time it is touched on a new day.

pub mod ranking;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::models::UserId;

pub use ranking::{format_leaderboard, format_seconds, RankedEntry};

#[derive(Debug, Clone, Copy)]
struct Entry {
    seconds: f64,
    /// Position of the user's first submission today; breaks ties in ranking.
    seq: u64,
}

/// Today's set times, one per user.
#[derive(Debug)]
pub struct Leaderboard {
    timezone: Tz,
    current_day: NaiveDate,
    times: HashMap<UserId, Entry>,
    next_seq: u64,
}

impl Leaderboard {
    /// Create an empty board whose day marker is `now` in `timezone`.
    pub fn new(timezone: Tz, now: DateTime<Utc>) -> Self {
        Self::starting_on(timezone, local_day(timezone, now))
    }

    /// Create an empty board with an explicit day marker.
    pub fn starting_on(timezone: Tz, day: NaiveDate) -> Self {
        Self {
            timezone,
            current_day: day,
            times: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    /// Clear the board if `now` falls on a different day than the marker.
    ///
    /// Returns `true` when the board was reset. Calling it again on the same
    /// day is a no-op.
    pub fn maybe_roll_over(&mut self, now: DateTime<Utc>) -> bool {
        let today = local_day(self.timezone, now);
        if today == self.current_day {
            return false;
        }

        let cleared = self.times.len();
        self.times.clear();
        self.next_seq = 0;
        self.current_day = today;
        info!(day = %today, cleared, "New day - cleared leaderboard");
        true
    }

    /// Set the user's time for today, replacing any earlier submission.
    ///
    /// Values are stored as given; no range checking happens here.
    pub fn record(&mut self, user: UserId, seconds: f64) {
        match self.times.get_mut(&user) {
            Some(entry) => entry.seconds = seconds,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.times.insert(user, Entry { seconds, seq });
            }
        }
    }

    /// The user's time for today, if they have submitted one.
    pub fn get(&self, user: &UserId) -> Option<f64> {
        self.times.get(user).map(|e| e.seconds)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// All entries in first-submission order.
    pub(crate) fn entries_in_submission_order(&self) -> Vec<(&UserId, f64)> {
        let mut entries: Vec<_> = self.times.iter().collect();
        entries.sort_by_key(|(_, e)| e.seq);
        entries.into_iter().map(|(u, e)| (u, e.seconds)).collect()
    }
}

/// The calendar date of `now` in `timezone`.
pub fn local_day(timezone: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&timezone).date_naive()
}
