//! Core data models for the set bot.

mod ids;
pub mod score;

pub use ids::*;
pub use score::{find_match, parse_score, ScoreMatch};
