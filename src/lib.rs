//! # Setbot
//!
//! A Slack bot that keeps a daily leaderboard of workout set times.
//!
//! ## Architecture
//!
//! - **models**: Slack identifiers and set-time parsing
//! - **leaderboard**: Today's times per user, ranking and rendering
//! - **handler**: Reacts to message events
//! - **slack**: Web API client, Events API payloads, request signing
//! - **api**: HTTP endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod config;
pub mod handler;
pub mod leaderboard;
pub mod models;
pub mod slack;

pub use models::*;
