use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Lesson,
    Streak,
    Subscription,
    System,
    Achievement,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Lesson => "lesson",
            NotificationType::Streak => "streak",
            NotificationType::Subscription => "subscription",
            NotificationType::System => "system",
            NotificationType::Achievement => "achievement",
        }
    }

    /// Icon name the dashboard renders next to the entry.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Lesson => "book-open",
            NotificationType::Streak | NotificationType::Achievement => "award",
            NotificationType::Subscription => "credit-card",
            NotificationType::System => "alert-triangle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// One event surfaced to the operator in the bell dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    pub action_url: Option<String>,
    pub priority: Option<Priority>,
}

/// Input of `add_notification`: id, timestamp and read flag are assigned by the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationPreferences {
    pub whatsapp_notifications: bool,
    pub push_notifications: bool,
    pub email_notifications: bool,
    /// Wall-clock time of day, e.g. "08:00".
    pub delivery_time: String,
    pub frequency: Frequency,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            whatsapp_notifications: true,
            push_notifications: true,
            email_notifications: false,
            delivery_time: "08:00".to_string(),
            frequency: Frequency::Daily,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

/// Partial preference update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PreferencesUpdate {
    pub whatsapp_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub email_notifications: Option<bool>,
    pub delivery_time: Option<String>,
    pub frequency: Option<Frequency>,
    pub sound_enabled: Option<bool>,
    pub vibration_enabled: Option<bool>,
}

impl NotificationPreferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(value) = update.whatsapp_notifications {
            self.whatsapp_notifications = value;
        }
        if let Some(value) = update.push_notifications {
            self.push_notifications = value;
        }
        if let Some(value) = update.email_notifications {
            self.email_notifications = value;
        }
        if let Some(value) = update.delivery_time {
            self.delivery_time = value;
        }
        if let Some(value) = update.frequency {
            self.frequency = value;
        }
        if let Some(value) = update.sound_enabled {
            self.sound_enabled = value;
        }
        if let Some(value) = update.vibration_enabled {
            self.vibration_enabled = value;
        }
    }
}

/// Where a pointer-down landed relative to the bell and its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    Trigger,
    Panel,
    Outside,
}

/// Outcome of selecting a notification in the panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Selection {
    pub found: bool,
    pub marked_read: bool,
    pub navigate_to: Option<String>,
    pub dropdown_visible: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active notification session")]
    SessionNotFound,
}
