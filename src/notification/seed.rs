use chrono::{DateTime, Duration, Utc};

use crate::notification::model::{Notification, NotificationType, Priority};

/// Demo history a fresh dashboard session can start from, newest first.
pub fn demo_notifications(now: DateTime<Utc>) -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            title: "🎉 New lesson sent!".to_string(),
            message: "Lesson 'Present Simple' has been sent to 247 students at 8:00 AM"
                .to_string(),
            notification_type: NotificationType::Lesson,
            read: false,
            timestamp: now - Duration::minutes(30),
            action_url: Some("/lessons/present-simple".to_string()),
            priority: Some(Priority::Medium),
        },
        Notification {
            id: 2,
            title: "🌟 Streak milestone reached!".to_string(),
            message: "You've maintained a 5-day teaching streak! Keep it up!".to_string(),
            notification_type: NotificationType::Streak,
            read: false,
            timestamp: now - Duration::hours(2),
            action_url: None,
            priority: Some(Priority::High),
        },
        Notification {
            id: 3,
            title: "💳 Subscription reminder".to_string(),
            message: "Your subscription renews in 3 days".to_string(),
            notification_type: NotificationType::Subscription,
            read: true,
            timestamp: now - Duration::hours(24),
            action_url: Some("/settings/billing".to_string()),
            priority: Some(Priority::Medium),
        },
    ]
}
