//! Slack Events API receiver.
//!
//! Every request is signature-checked before its body is looked at. A
//! verified event has its score recorded before the 200 goes out; the chat
//! calls it earns run in a background task, so slow Web API calls never hold
//! up the acknowledgement. Slack redelivers events it thinks went
//! unanswered, so an `event_id` already seen is acknowledged and dropped.
//! Events skipped on purpose are still answered with 200.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::handler::Outcome;
use crate::slack::events::EventEnvelope;

const RETRY_NUM_HEADER: &str = "x-slack-retry-num";

pub async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if let Err(e) = state.verifier.verify(&headers, &body, state.clock.now()) {
        warn!("Rejected Slack request: {}", e);
        return Err(ApiError::Unauthorized(e.to_string()));
    }

    let retry = headers.get(RETRY_NUM_HEADER).and_then(|v| v.to_str().ok());
    if let Some(retry) = retry {
        debug!(retry, "Slack is redelivering an event");
    }

    let envelope: EventEnvelope = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unparseable Slack payload: {}", e);
        ApiError::BadRequest(e.to_string())
    })?;

    if let EventEnvelope::EventCallback {
        event_id: Some(event_id),
        ..
    } = &envelope
    {
        if !state.recent_events.first_delivery(event_id) {
            info!(event_id = %event_id, ?retry, "Acknowledging an event that was already handled");
            return Ok(StatusCode::OK.into_response());
        }
    }

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            debug!("Answering URL verification challenge");
            return Ok((StatusCode::OK, challenge).into_response());
        }
        EventEnvelope::EventCallback { event, event_id } if event.is_message() => {
            match state.handler.apply_message(&event).await {
                Ok((Outcome::Ignored, _)) => {}
                Ok((outcome, replies)) => {
                    debug!(?event_id, ?outcome, "Event handled");
                    if let Some(replies) = replies {
                        let handler = state.handler.clone();
                        tokio::spawn(async move {
                            handler.send_replies(&replies).await;
                        });
                    }
                }
                Err(e) => warn!(?event_id, "Skipping malformed message event: {}", e),
            }
        }
        EventEnvelope::EventCallback { event, .. } => {
            debug!(kind = %event.kind, "Ignoring event");
        }
        EventEnvelope::Other => {
            debug!("Ignoring envelope");
        }
    }

    Ok(StatusCode::OK.into_response())
}
