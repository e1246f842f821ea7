use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::notification::clock::Clock;
use crate::notification::push::PushHub;
use crate::notification::seed::demo_notifications;
use crate::notification::service::{Effects, NotificationCenter};

pub type SessionHandle = Arc<Mutex<NotificationCenter>>;

/// Owns one notification center per operator session.
pub struct NotificationSessions {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    clock: Arc<dyn Clock>,
    hub: PushHub,
    seed_demo: bool,
}

impl NotificationSessions {
    pub fn new(clock: Arc<dyn Clock>, hub: PushHub, seed_demo: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
            hub,
            seed_demo,
        }
    }

    /// Return the operator's center, starting a session on first access.
    pub async fn open(&self, operator_id: Uuid) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(&operator_id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(operator_id)
            .or_insert_with(|| self.start(operator_id))
            .clone()
    }

    fn start(&self, operator_id: Uuid) -> SessionHandle {
        let channel = Arc::new(self.hub.channel(operator_id));
        let effects = Effects {
            sound: Some(channel.clone()),
            platform: Some(channel.clone()),
            navigator: Some(channel),
        };

        let mut center = NotificationCenter::new(self.clock.clone(), effects);
        if self.seed_demo {
            center = center.with_history(demo_notifications(self.clock.now()));
        }

        self.hub.request_permission(operator_id);
        info!(
            "Started notification session for operator {} with {} notifications",
            operator_id,
            center.len()
        );

        Arc::new(Mutex::new(center))
    }

    /// Tear down the operator's session. Its notifications are gone afterwards.
    pub async fn end(&self, operator_id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(operator_id).is_some();
        self.hub.forget(operator_id);
        if removed {
            info!("Ended notification session for operator {}", operator_id);
        }
        removed
    }

    pub async fn active(&self) -> usize {
        self.sessions.read().await.len()
    }
}
