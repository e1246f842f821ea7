use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::notification::clock::Clock;
use crate::notification::display::{
    badge_label, unread_summary, GroupView, NotificationView, PanelView,
};
use crate::notification::effects::{
    Navigator, Permission, PlatformNotification, PlatformNotifier, SoundPlayer,
    NOTIFICATION_SOUND_ASSET, NOTIFICATION_SOUND_VOLUME, PLATFORM_NOTIFICATION_ICON, SETTINGS_PATH,
};
use crate::notification::grouping::{group_by_date, NotificationGroups};
use crate::notification::model::{
    NewNotification, Notification, NotificationPreferences, PointerTarget, PreferencesUpdate,
    Selection,
};

/// Optional side-effect collaborators wired into a center.
#[derive(Clone, Default)]
pub struct Effects {
    pub sound: Option<Arc<dyn SoundPlayer>>,
    pub platform: Option<Arc<dyn PlatformNotifier>>,
    pub navigator: Option<Arc<dyn Navigator>>,
}

/// In-memory notification feed, preference record and dropdown state of one operator session.
pub struct NotificationCenter {
    // Newest first.
    notifications: VecDeque<Notification>,
    preferences: NotificationPreferences,
    dropdown_visible: bool,
    next_id: i64,
    clock: Arc<dyn Clock>,
    effects: Effects,
}

impl NotificationCenter {
    pub fn new(clock: Arc<dyn Clock>, effects: Effects) -> Self {
        Self {
            notifications: VecDeque::new(),
            preferences: NotificationPreferences::default(),
            dropdown_visible: false,
            next_id: 1,
            clock,
            effects,
        }
    }

    /// Start from an existing newest-first history, e.g. the demo seed.
    pub fn with_history(mut self, history: Vec<Notification>) -> Self {
        self.next_id = history.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        self.notifications = history.into();
        self
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn get(&self, id: i64) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn preferences(&self) -> &NotificationPreferences {
        &self.preferences
    }

    pub fn dropdown_visible(&self) -> bool {
        self.dropdown_visible
    }

    pub fn add_notification(&mut self, input: NewNotification) -> Notification {
        let notification = Notification {
            id: self.next_id,
            title: input.title,
            message: input.message,
            notification_type: input.notification_type,
            read: false,
            timestamp: self.clock.now(),
            action_url: input.action_url,
            priority: input.priority,
        };
        self.next_id += 1;
        self.notifications.push_front(notification.clone());

        info!(
            "Added {} notification {}",
            notification.notification_type.as_str(),
            notification.id
        );

        self.play_sound();
        self.show_platform_notification(&notification);

        notification
    }

    fn play_sound(&self) {
        if !self.preferences.sound_enabled {
            return;
        }
        if let Some(sound) = &self.effects.sound {
            if let Err(e) = sound.play(NOTIFICATION_SOUND_ASSET, NOTIFICATION_SOUND_VOLUME) {
                warn!("Could not play notification sound: {}", e);
            }
        }
    }

    fn show_platform_notification(&self, notification: &Notification) {
        if !self.preferences.push_notifications {
            return;
        }
        let Some(platform) = &self.effects.platform else {
            return;
        };
        if platform.permission() != Permission::Granted {
            debug!("Platform notification permission not granted, skipping");
            return;
        }

        let payload = PlatformNotification {
            title: notification.title.clone(),
            body: notification.message.clone(),
            icon: PLATFORM_NOTIFICATION_ICON.to_string(),
        };
        if let Err(e) = platform.notify(&payload) {
            warn!("Could not show platform notification: {}", e);
        }
    }

    /// Returns whether the entry changed from unread to read.
    pub fn mark_as_read(&mut self, id: i64) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                debug!("Marked notification {} as read", id);
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for notification in self.notifications.iter_mut() {
            notification.read = true;
        }
    }

    pub fn remove_notification(&mut self, id: i64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        before != self.notifications.len()
    }

    /// Drop entries whose timestamp is at or before `now - days`. Returns how many were removed.
    pub fn clear_old_notifications(&mut self, days: NonZeroU32) -> usize {
        let before = self.notifications.len();
        // A cutoff before the representable range leaves nothing old enough to drop
        if let Some(cutoff) = self
            .clock
            .now()
            .checked_sub_signed(Duration::days(i64::from(days.get())))
        {
            self.notifications.retain(|n| n.timestamp > cutoff);
        }

        let removed = before - self.notifications.len();
        info!(
            "Cleared {} notifications older than {} days",
            removed,
            days.get()
        );
        removed
    }

    pub fn update_preferences(&mut self, update: PreferencesUpdate) -> &NotificationPreferences {
        self.preferences.apply(update);
        &self.preferences
    }

    pub fn set_dropdown_visible(&mut self, visible: bool) {
        self.dropdown_visible = visible;
    }

    pub fn toggle_dropdown(&mut self) -> bool {
        self.dropdown_visible = !self.dropdown_visible;
        self.dropdown_visible
    }

    /// Close the dropdown when a pointer-down lands outside both the trigger and the panel.
    pub fn pointer_down(&mut self, target: PointerTarget) -> bool {
        if target == PointerTarget::Outside && self.dropdown_visible {
            self.dropdown_visible = false;
        }
        self.dropdown_visible
    }

    /// Mark read, follow the action URL if any, and close the dropdown when navigating.
    pub fn select_notification(&mut self, id: i64) -> Selection {
        let Some(action_url) = self.get(id).map(|n| n.action_url.clone()) else {
            return Selection {
                dropdown_visible: self.dropdown_visible,
                ..Selection::default()
            };
        };

        let marked_read = self.mark_as_read(id);

        if let Some(path) = &action_url {
            self.navigate(path);
            self.dropdown_visible = false;
            debug!("Closed dropdown after selecting notification {}", id);
        }

        Selection {
            found: true,
            marked_read,
            navigate_to: action_url,
            dropdown_visible: self.dropdown_visible,
        }
    }

    pub fn open_settings(&self) -> &'static str {
        self.navigate(SETTINGS_PATH);
        SETTINGS_PATH
    }

    fn navigate(&self, path: &str) {
        if let Some(navigator) = &self.effects.navigator {
            if let Err(e) = navigator.navigate(path) {
                warn!("Navigation request to {} was not delivered: {}", path, e);
            }
        }
    }

    pub fn groups(&self) -> NotificationGroups<'_> {
        let now = self
            .clock
            .now()
            .with_timezone(&self.clock.local_offset());
        group_by_date(self.notifications.iter(), now)
    }

    pub fn panel(&self) -> PanelView {
        let now = self.clock.now();
        let unread = self.unread_count();
        let groups = self
            .groups()
            .non_empty()
            .into_iter()
            .map(|(group, items)| GroupView {
                group,
                label: group.label(),
                notifications: items
                    .into_iter()
                    .map(|n| NotificationView::new(n, now))
                    .collect(),
            })
            .collect();

        PanelView {
            badge: badge_label(unread),
            unread_count: unread,
            unread_summary: unread_summary(unread),
            dropdown_visible: self.dropdown_visible,
            is_empty: self.notifications.is_empty(),
            groups,
        }
    }

    pub fn views(&self) -> Vec<NotificationView> {
        let now = self.clock.now();
        self.notifications()
            .map(|n| NotificationView::new(n, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::clock::ManualClock;
    use crate::notification::effects::{
        EffectError, MockNavigator, MockPlatformNotifier, MockSoundPlayer,
    };
    use crate::notification::model::{NotificationType, Priority};
    use chrono::{FixedOffset, TimeZone, Utc};
    use mockall::predicate::eq;
    use std::sync::{Mutex, PoisonError};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Ordered record of center log lines and collaborator calls.
    #[derive(Clone, Default)]
    struct EventLog(Arc<Mutex<Vec<String>>>);

    impl EventLog {
        fn push(&self, entry: String) {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry);
        }

        fn position(&self, prefix: &str) -> usize {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .position(|entry| entry.starts_with(prefix))
                .unwrap_or_else(|| panic!("no log entry starting with {:?}", prefix))
        }
    }

    struct MessageVisitor<'a>(&'a mut String);

    impl tracing::field::Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for EventLog {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.push(message);
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        ))
    }

    fn lesson(title: &str) -> NewNotification {
        NewNotification {
            title: title.to_string(),
            message: format!("{} was sent", title),
            notification_type: NotificationType::Lesson,
            action_url: None,
            priority: Some(Priority::Medium),
        }
    }

    fn quiet_center(clock: Arc<ManualClock>) -> NotificationCenter {
        NotificationCenter::new(clock, Effects::default())
    }

    fn ids(center: &NotificationCenter) -> Vec<i64> {
        center.notifications().map(|n| n.id).collect()
    }

    #[test]
    fn test_add_prepends_with_fresh_ids() {
        let mut center = quiet_center(clock());
        let first = center.add_notification(lesson("Present Simple"));
        let second = center.add_notification(lesson("Past Simple"));

        assert_ne!(first.id, second.id);
        assert_eq!(ids(&center), vec![second.id, first.id]);
        assert!(!second.read);
    }

    #[test]
    fn test_unread_count_tracks_every_mutation() {
        let mut center = quiet_center(clock());
        for i in 0..5 {
            center.add_notification(lesson(&format!("Lesson {}", i)));
            assert_eq!(center.unread_count(), i + 1);
        }

        let newest = center.notifications().next().unwrap().id;
        center.mark_as_read(newest);
        assert_eq!(center.unread_count(), 4);

        center.remove_notification(newest);
        assert_eq!(center.unread_count(), 4);

        let unread_one = center.notifications().next().unwrap().id;
        center.remove_notification(unread_one);
        assert_eq!(center.unread_count(), 3);
    }

    #[test]
    fn test_mark_as_read_is_idempotent() {
        let mut center = quiet_center(clock());
        let n = center.add_notification(lesson("Grammar Basics"));

        assert!(center.mark_as_read(n.id));
        let once: Vec<Notification> = center.notifications().cloned().collect();
        assert!(!center.mark_as_read(n.id));
        let twice: Vec<Notification> = center.notifications().cloned().collect();

        assert_eq!(once, twice);
        assert!(!center.mark_as_read(999));
    }

    #[test]
    fn test_mark_all_then_add_leaves_one_unread() {
        let mut center = quiet_center(clock());
        center.add_notification(lesson("A"));
        center.add_notification(lesson("B"));
        center.mark_all_as_read();
        center.mark_all_as_read();
        assert_eq!(center.unread_count(), 0);

        center.add_notification(lesson("C"));
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_remove_unknown_id_leaves_collection_unchanged() {
        let mut center = quiet_center(clock());
        center.add_notification(lesson("A"));
        center.add_notification(lesson("B"));
        let before: Vec<Notification> = center.notifications().cloned().collect();

        assert!(!center.remove_notification(42));
        let after: Vec<Notification> = center.notifications().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_clear_old_notifications_keeps_recent_entries() {
        let clock = clock();
        let mut center = quiet_center(clock.clone());
        let start = clock.now();

        let oldest = center.add_notification(lesson("eight days"));
        clock.advance(Duration::days(5));
        let middle = center.add_notification(lesson("three days"));
        clock.advance(Duration::days(3));
        let newest = center.add_notification(lesson("now"));
        assert_eq!(clock.now(), start + Duration::days(8));

        let removed = center.clear_old_notifications(NonZeroU32::new(7).unwrap());
        assert_eq!(removed, 1);
        assert_eq!(ids(&center), vec![newest.id, middle.id]);
        assert!(center.get(oldest.id).is_none());
    }

    #[test]
    fn test_clear_purges_entry_exactly_at_cutoff() {
        let clock = clock();
        let mut center = quiet_center(clock.clone());
        center.add_notification(lesson("boundary"));
        clock.advance(Duration::days(1));

        assert_eq!(center.clear_old_notifications(NonZeroU32::new(1).unwrap()), 1);
        assert_eq!(center.len(), 0);
    }

    #[test]
    fn test_update_preferences_changes_only_given_field() {
        let mut center = quiet_center(clock());
        let before = center.preferences().clone();
        center.update_preferences(PreferencesUpdate {
            sound_enabled: Some(false),
            ..Default::default()
        });

        let after = center.preferences();
        assert!(!after.sound_enabled);
        assert_eq!(after.push_notifications, before.push_notifications);
        assert_eq!(after.delivery_time, before.delivery_time);
        assert_eq!(after.frequency, before.frequency);
        assert_eq!(after.vibration_enabled, before.vibration_enabled);
    }

    #[test]
    fn test_grouping_against_clock() {
        let clock = clock();
        let mut center = quiet_center(clock.clone());
        center.add_notification(lesson("ten days"));
        clock.advance(Duration::days(10) - Duration::hours(25));
        center.add_notification(lesson("yesterday"));
        clock.advance(Duration::hours(25));
        center.add_notification(lesson("today"));

        let groups = center.groups();
        assert_eq!(groups.today.len(), 1);
        assert_eq!(groups.yesterday.len(), 1);
        assert_eq!(groups.earlier.len(), 1);
        assert_eq!(groups.today[0].title, "today");
        assert_eq!(groups.yesterday[0].title, "yesterday");
    }

    #[test]
    fn test_sound_played_when_enabled_and_failure_swallowed() {
        let mut sound = MockSoundPlayer::new();
        sound
            .expect_play()
            .with(eq(NOTIFICATION_SOUND_ASSET), eq(NOTIFICATION_SOUND_VOLUME))
            .times(1)
            .returning(|_, _| Err(EffectError::NoSubscribers));

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                sound: Some(Arc::new(sound)),
                ..Effects::default()
            },
        );
        let added = center.add_notification(lesson("A"));
        assert_eq!(center.get(added.id), Some(&added));
    }

    #[test]
    fn test_sound_skipped_when_disabled() {
        let mut sound = MockSoundPlayer::new();
        sound.expect_play().times(0);

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                sound: Some(Arc::new(sound)),
                ..Effects::default()
            },
        );
        center.update_preferences(PreferencesUpdate {
            sound_enabled: Some(false),
            ..Default::default()
        });
        center.add_notification(lesson("A"));
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_platform_notification_requires_granted_permission() {
        let mut platform = MockPlatformNotifier::new();
        platform
            .expect_permission()
            .times(1)
            .returning(|| Permission::Default);
        platform.expect_notify().times(0);

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                platform: Some(Arc::new(platform)),
                ..Effects::default()
            },
        );
        center.add_notification(lesson("A"));
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_platform_notification_payload_and_failure_swallowed() {
        let mut platform = MockPlatformNotifier::new();
        platform
            .expect_permission()
            .returning(|| Permission::Granted);
        platform
            .expect_notify()
            .withf(|n: &PlatformNotification| {
                n.title == "Streak" && n.body == "Streak was sent" && n.icon == "/favicon.ico"
            })
            .times(1)
            .returning(|_| Err(EffectError::Unavailable("blocked".to_string())));

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                platform: Some(Arc::new(platform)),
                ..Effects::default()
            },
        );
        let added = center.add_notification(lesson("Streak"));
        assert_eq!(center.get(added.id).map(|n| n.read), Some(false));
    }

    #[test]
    fn test_platform_notification_skipped_when_push_disabled() {
        let mut platform = MockPlatformNotifier::new();
        platform.expect_permission().times(0);
        platform.expect_notify().times(0);

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                platform: Some(Arc::new(platform)),
                ..Effects::default()
            },
        );
        center.update_preferences(PreferencesUpdate {
            push_notifications: Some(false),
            ..Default::default()
        });
        center.add_notification(lesson("A"));
    }

    #[test]
    fn test_select_unread_with_action_url() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq("/lessons/present-simple"))
            .times(1)
            .returning(|_| Ok(()));

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                navigator: Some(Arc::new(navigator)),
                ..Effects::default()
            },
        );
        let mut input = lesson("Present Simple");
        input.action_url = Some("/lessons/present-simple".to_string());
        let n = center.add_notification(input);
        center.set_dropdown_visible(true);

        let selection = center.select_notification(n.id);
        assert_eq!(
            selection,
            Selection {
                found: true,
                marked_read: true,
                navigate_to: Some("/lessons/present-simple".to_string()),
                dropdown_visible: false,
            }
        );
        assert!(center.get(n.id).unwrap().read);
        assert!(!center.dropdown_visible());
    }

    #[test]
    fn test_select_marks_read_then_navigates_then_closes() {
        let log = EventLog::default();
        let navigation_log = log.clone();
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .times(1)
            .returning(move |path| {
                navigation_log.push(format!("navigate {}", path));
                Ok(())
            });

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                navigator: Some(Arc::new(navigator)),
                ..Effects::default()
            },
        );
        let mut input = lesson("Past Simple");
        input.action_url = Some("/lessons/past-simple".to_string());
        let n = center.add_notification(input);
        center.set_dropdown_visible(true);

        let subscriber = tracing_subscriber::registry().with(log.clone());
        tracing::subscriber::with_default(subscriber, || {
            center.select_notification(n.id);
        });

        let read = log.position(&format!("Marked notification {} as read", n.id));
        let navigate = log.position("navigate /lessons/past-simple");
        let closed = log.position("Closed dropdown");
        assert!(read < navigate, "navigation happened before marking read");
        assert!(navigate < closed, "dropdown closed before navigation");
    }

    #[test]
    fn test_clear_with_out_of_range_days_keeps_everything() {
        let mut center = quiet_center(clock());
        center.add_notification(lesson("fresh"));

        let removed = center.clear_old_notifications(NonZeroU32::new(100_000_000).unwrap());
        assert_eq!(removed, 0);
        assert_eq!(center.len(), 1);

        assert_eq!(center.clear_old_notifications(NonZeroU32::MAX), 0);
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_select_read_without_action_url_keeps_dropdown_open() {
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().times(0);

        let mut center = NotificationCenter::new(
            clock(),
            Effects {
                navigator: Some(Arc::new(navigator)),
                ..Effects::default()
            },
        );
        let n = center.add_notification(lesson("Plain"));
        center.mark_as_read(n.id);
        center.set_dropdown_visible(true);

        let selection = center.select_notification(n.id);
        assert!(selection.found);
        assert!(!selection.marked_read);
        assert!(selection.navigate_to.is_none());
        assert!(center.dropdown_visible());
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let mut center = quiet_center(clock());
        center.set_dropdown_visible(true);
        let selection = center.select_notification(7);
        assert!(!selection.found);
        assert!(selection.dropdown_visible);
    }

    #[test]
    fn test_pointer_outside_closes_dropdown() {
        let mut center = quiet_center(clock());
        center.set_dropdown_visible(true);

        assert!(center.pointer_down(PointerTarget::Panel));
        assert!(center.pointer_down(PointerTarget::Trigger));
        assert!(!center.pointer_down(PointerTarget::Outside));
        assert!(!center.pointer_down(PointerTarget::Outside));
    }

    #[test]
    fn test_toggle_and_set_dropdown() {
        let mut center = quiet_center(clock());
        assert!(center.toggle_dropdown());
        center.set_dropdown_visible(true);
        assert!(center.dropdown_visible());
        assert!(!center.toggle_dropdown());
    }

    #[test]
    fn test_open_settings_requests_navigation() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(SETTINGS_PATH))
            .times(1)
            .returning(|_| Err(EffectError::NoSubscribers));

        let center = NotificationCenter::new(
            clock(),
            Effects {
                navigator: Some(Arc::new(navigator)),
                ..Effects::default()
            },
        );
        assert_eq!(center.open_settings(), "/settings");
    }

    #[test]
    fn test_panel_view() {
        let mut center = quiet_center(clock());
        assert!(center.panel().is_empty);
        assert!(center.panel().badge.is_none());

        for i in 0..150 {
            center.add_notification(lesson(&format!("Lesson {}", i)));
        }
        let panel = center.panel();
        assert_eq!(panel.unread_count, 150);
        assert_eq!(panel.badge.as_deref(), Some("99+"));
        assert_eq!(panel.groups.len(), 1);
        assert_eq!(panel.groups[0].label, "Today");
        assert_eq!(panel.groups[0].notifications[0].icon, "book-open");
    }

    #[test]
    fn test_history_ids_continue_after_max() {
        let clock = clock();
        let seed = vec![Notification {
            id: 3,
            title: "seed".to_string(),
            message: String::new(),
            notification_type: NotificationType::System,
            read: true,
            timestamp: clock.now(),
            action_url: None,
            priority: None,
        }];
        let mut center = quiet_center(clock).with_history(seed);
        let added = center.add_notification(lesson("next"));
        assert_eq!(added.id, 4);
        assert_eq!(ids(&center), vec![4, 3]);
    }
}
