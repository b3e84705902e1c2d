use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::searches::notify::Notifier;
use crate::searches::tracker::MatchTracker;
use crate::store::JobBoardStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence. Postgres in production, in-memory in tests.
    pub store: Arc<dyn JobBoardStore>,
    /// Recruiter notification delivery. Webhook relay or log-only.
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

impl AppState {
    pub fn tracker(&self) -> MatchTracker {
        MatchTracker::new(
            self.store.clone(),
            self.notifier.clone(),
            self.clock.clone(),
            self.config.mail_settings(),
        )
    }
}
