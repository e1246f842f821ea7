use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::notification::model::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateGroup {
    Today,
    Yesterday,
    Earlier,
}

impl DateGroup {
    pub fn label(&self) -> &'static str {
        match self {
            DateGroup::Today => "Today",
            DateGroup::Yesterday => "Yesterday",
            DateGroup::Earlier => "Earlier",
        }
    }
}

#[derive(Debug, Default)]
pub struct NotificationGroups<'a> {
    pub today: Vec<&'a Notification>,
    pub yesterday: Vec<&'a Notification>,
    pub earlier: Vec<&'a Notification>,
}

impl<'a> NotificationGroups<'a> {
    /// Buckets in display order, empty ones left out.
    pub fn non_empty(self) -> Vec<(DateGroup, Vec<&'a Notification>)> {
        [
            (DateGroup::Today, self.today),
            (DateGroup::Yesterday, self.yesterday),
            (DateGroup::Earlier, self.earlier),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .collect()
    }
}

/// Partition notifications by the calendar date of their timestamp in `now`'s offset.
///
/// Anything that is neither today nor yesterday lands in `earlier`, including
/// timestamps that lie in the future. Input order is kept inside each bucket.
pub fn group_by_date<'a, I>(notifications: I, now: DateTime<FixedOffset>) -> NotificationGroups<'a>
where
    I: IntoIterator<Item = &'a Notification>,
{
    let offset = *now.offset();
    let today = now.date_naive();
    let yesterday: Option<NaiveDate> = today.pred_opt();

    let mut groups = NotificationGroups::default();
    for notification in notifications {
        let date = notification.timestamp.with_timezone(&offset).date_naive();
        if date == today {
            groups.today.push(notification);
        } else if Some(date) == yesterday {
            groups.yesterday.push(notification);
        } else {
            groups.earlier.push(notification);
        }
    }

    groups
}
