//! Push fan-out to the dashboard clients connected over WebSocket.
//!
//! The connected dashboard is the "platform" of an operator: it plays the
//! notification sound, shows native notifications, follows navigation
//! requests and answers the permission prompt.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::notification::effects::{
    EffectError, Navigator, Permission, PlatformNotification, PlatformNotifier, SoundPlayer,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    PlaySound {
        asset: String,
        volume: f32,
    },
    PlatformNotification {
        title: String,
        body: String,
        icon: String,
    },
    Navigate {
        path: String,
    },
    PermissionRequest,
}

/// Event addressed to one operator's clients.
#[derive(Debug, Clone)]
pub struct PushEnvelope {
    pub operator_id: Uuid,
    pub event: PushEvent,
}

#[derive(Debug, Clone, Copy, Default)]
struct PermissionState {
    permission: Permission,
    requested: bool,
}

#[derive(Debug, Clone)]
pub struct PushHub {
    tx: broadcast::Sender<PushEnvelope>,
    permissions: Arc<RwLock<HashMap<Uuid, PermissionState>>>,
}

impl PushHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            permissions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEnvelope> {
        self.tx.subscribe()
    }

    /// Collaborator handle scoped to one operator.
    pub fn channel(&self, operator_id: Uuid) -> OperatorChannel {
        OperatorChannel {
            operator_id,
            hub: self.clone(),
        }
    }

    pub fn send(&self, operator_id: Uuid, event: PushEvent) -> Result<(), EffectError> {
        self.tx
            .send(PushEnvelope { operator_id, event })
            .map(|_| ())
            .map_err(|_| EffectError::NoSubscribers)
    }

    fn state(&self, operator_id: &Uuid) -> PermissionState {
        self.permissions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(operator_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn permission(&self, operator_id: &Uuid) -> Permission {
        self.state(operator_id).permission
    }

    /// Issue the operator's permission prompt. Only the first call has an effect.
    pub fn request_permission(&self, operator_id: Uuid) -> bool {
        {
            let mut permissions = self
                .permissions
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let state = permissions.entry(operator_id).or_default();
            if state.requested || state.permission != Permission::Default {
                return false;
            }
            state.requested = true;
        }

        if let Err(e) = self.send(operator_id, PushEvent::PermissionRequest) {
            debug!(
                "Permission request for operator {} queued until a client connects: {}",
                operator_id, e
            );
        }
        true
    }

    /// A request was issued and nobody has answered yet.
    pub fn has_pending_request(&self, operator_id: &Uuid) -> bool {
        let state = self.state(operator_id);
        state.requested && state.permission == Permission::Default
    }

    /// Record a client's answer to the prompt. The first decision sticks.
    pub fn resolve_permission(&self, operator_id: Uuid, answer: Permission) -> Permission {
        let mut permissions = self
            .permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let state = permissions.entry(operator_id).or_default();
        if state.permission == Permission::Default && answer != Permission::Default {
            info!(
                "Operator {} answered permission prompt: {:?}",
                operator_id, answer
            );
            state.permission = answer;
        }
        state.permission
    }

    pub fn forget(&self, operator_id: &Uuid) {
        self.permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(operator_id);
    }
}

/// Side-effect collaborator for a single operator, backed by the hub.
#[derive(Debug, Clone)]
pub struct OperatorChannel {
    operator_id: Uuid,
    hub: PushHub,
}

impl SoundPlayer for OperatorChannel {
    fn play(&self, asset: &str, volume: f32) -> Result<(), EffectError> {
        self.hub.send(
            self.operator_id,
            PushEvent::PlaySound {
                asset: asset.to_string(),
                volume,
            },
        )
    }
}

impl PlatformNotifier for OperatorChannel {
    fn permission(&self) -> Permission {
        self.hub.permission(&self.operator_id)
    }

    fn notify(&self, notification: &PlatformNotification) -> Result<(), EffectError> {
        self.hub.send(
            self.operator_id,
            PushEvent::PlatformNotification {
                title: notification.title.clone(),
                body: notification.body.clone(),
                icon: notification.icon.clone(),
            },
        )
    }
}

impl Navigator for OperatorChannel {
    fn navigate(&self, path: &str) -> Result<(), EffectError> {
        self.hub.send(
            self.operator_id,
            PushEvent::Navigate {
                path: path.to_string(),
            },
        )
    }
}
