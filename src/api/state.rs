use std::sync::Arc;

use crate::handler::{Clock, EventHandler};
use crate::slack::events::RecentEvents;
use crate::slack::signature::SignatureVerifier;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<EventHandler>,
    pub verifier: Arc<SignatureVerifier>,
    pub clock: Arc<dyn Clock>,
    pub recent_events: Arc<RecentEvents>,
}
