use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::handler::Standings;

/// Today's top times.
pub async fn get_leaderboard(State(state): State<AppState>) -> Json<Standings> {
    Json(state.handler.standings().await)
}
