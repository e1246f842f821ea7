use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::notification::grouping::DateGroup;
use crate::notification::model::{Notification, Priority};

const BADGE_CAP: usize = 99;

/// Badge text for the bell; nothing is shown when everything is read.
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > BADGE_CAP => Some(format!("{}+", BADGE_CAP)),
        n => Some(n.to_string()),
    }
}

pub fn unread_summary(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        1 => Some("You have 1 unread notification".to_string()),
        n => Some(format!("You have {} unread notifications", n)),
    }
}

/// Visual emphasis tier of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    High,
    Medium,
    Low,
    Neutral,
}

impl From<Option<Priority>> for Emphasis {
    fn from(priority: Option<Priority>) -> Self {
        match priority {
            Some(Priority::High) => Emphasis::High,
            Some(Priority::Medium) => Emphasis::Medium,
            Some(Priority::Low) => Emphasis::Low,
            None => Emphasis::Neutral,
        }
    }
}

/// Human distance between `then` and `now`, with an "ago"/"in" suffix.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let distance = distance_words(seconds.abs());
    if seconds < 0 {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn distance_words(seconds: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    // Rounded minutes drive most thresholds.
    let minutes = (seconds + 30) / MINUTE;

    if seconds < 30 {
        "less than a minute".to_string()
    } else if minutes < 2 {
        "1 minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < 24 * 60 {
        format!("about {} hours", (seconds + HOUR / 2) / HOUR)
    } else if minutes < 42 * 60 {
        "1 day".to_string()
    } else if seconds < MONTH {
        format!("{} days", (seconds + DAY / 2) / DAY)
    } else if seconds < 45 * DAY {
        "about 1 month".to_string()
    } else if seconds < 60 * DAY {
        "about 2 months".to_string()
    } else if seconds < YEAR {
        format!("{} months", seconds / MONTH)
    } else if seconds / YEAR == 1 {
        "about 1 year".to_string()
    } else {
        format!("about {} years", seconds / YEAR)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub icon: &'static str,
    pub emphasis: Emphasis,
    pub relative_time: String,
}

impl NotificationView {
    pub fn new(notification: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            icon: notification.notification_type.icon(),
            emphasis: notification.priority.into(),
            relative_time: relative_time(notification.timestamp, now),
            notification: notification.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupView {
    pub group: DateGroup,
    pub label: &'static str,
    pub notifications: Vec<NotificationView>,
}

/// Everything the bell trigger and the dropdown panel need to render.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PanelView {
    pub badge: Option<String>,
    pub unread_count: usize,
    pub unread_summary: Option<String>,
    pub dropdown_visible: bool,
    pub is_empty: bool,
    pub groups: Vec<GroupView>,
}
