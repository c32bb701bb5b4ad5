//! Ranking and chat rendering of the daily leaderboard.

use serde::Serialize;

use super::Leaderboard;
use crate::models::UserId;

/// Medal label for each podium position.
pub const PLACE_LABELS: [&str; 3] = ["first", "second", "third"];

pub const LEADERBOARD_HEADER: &str = "LEADERBOARD :trophy:";

/// A user's position on the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based
    pub rank: usize,
    pub user: UserId,
    pub seconds: f64,
}

impl Leaderboard {
    /// The `n` fastest times of the day, fastest first.
    ///
    /// Equal times keep the order in which the users first submitted.
    pub fn rank_top(&self, n: usize) -> Vec<RankedEntry> {
        let mut entries = self.entries_in_submission_order();
        // Stable sort, so submission order survives among ties.
        entries.sort_by(|(_, a), (_, b)| a.total_cmp(b));

        entries
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, (user, seconds))| RankedEntry {
                rank: i + 1,
                user: user.clone(),
                seconds,
            })
            .collect()
    }
}

/// Render ranked entries as a Slack message.
///
/// Only the podium positions have labels; anything past third place is not
/// rendered.
pub fn format_leaderboard(ranked: &[RankedEntry]) -> String {
    let mut text = format!("{}\n", LEADERBOARD_HEADER);
    for (entry, label) in ranked.iter().zip(PLACE_LABELS) {
        text.push_str(&format!(
            ":{}_place_medal:: {} ({}s)\n",
            label,
            entry.user.mention(),
            format_seconds(entry.seconds)
        ));
    }
    text
}

/// Render a time the way people write it: `58.32`, `3723.5`, and `60.0`
/// rather than a bare `60`.
pub fn format_seconds(seconds: f64) -> String {
    if seconds.is_finite() && seconds.fract() == 0.0 && seconds.abs() < 1e16 {
        format!("{:.1}", seconds)
    } else {
        format!("{}", seconds)
    }
}
