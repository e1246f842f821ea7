use std::sync::Arc;

use crate::config::AppConfig;
use crate::notification::clock::Clock;
use crate::notification::push::PushHub;
use crate::notification::session::NotificationSessions;

/// Shared state handed to every router.
#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<str>,
    pub sessions: Arc<NotificationSessions>,
    pub hub: PushHub,
}

impl AppState {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let hub = PushHub::new(config.push_channel_capacity);
        let sessions = NotificationSessions::new(clock, hub.clone(), config.seed_demo_notifications);

        Self {
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            sessions: Arc::new(sessions),
            hub,
        }
    }
}
