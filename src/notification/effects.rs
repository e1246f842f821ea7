//! Best-effort collaborators the notification center talks to.
//!
//! Every call returns a `Result` so failures are visible at the type level;
//! the center logs and drops them without touching its committed state.

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const NOTIFICATION_SOUND_ASSET: &str = "/notification-sound.mp3";
pub const NOTIFICATION_SOUND_VOLUME: f32 = 0.3;
pub const PLATFORM_NOTIFICATION_ICON: &str = "/favicon.ico";
pub const SETTINGS_PATH: &str = "/settings";

#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("No client is subscribed to the push channel")]
    NoSubscribers,

    #[error("Effect unavailable: {0}")]
    Unavailable(String),
}

/// Platform notification permission, mirroring the browser's tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

#[cfg_attr(test, automock)]
pub trait SoundPlayer: Send + Sync {
    fn play(&self, asset: &str, volume: f32) -> Result<(), EffectError>;
}

#[cfg_attr(test, automock)]
pub trait PlatformNotifier: Send + Sync {
    /// Current permission; read-only from the center's point of view.
    fn permission(&self) -> Permission;

    fn notify(&self, notification: &PlatformNotification) -> Result<(), EffectError>;
}

#[cfg_attr(test, automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str) -> Result<(), EffectError>;
}
