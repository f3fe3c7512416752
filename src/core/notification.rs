//! Notification feed business logic.
//!
//! Two layers live here. The free functions read and write notification rows and
//! publish a change event for every write. [`NotificationFeed`] is the per-user view
//! a surface keeps in memory: a window of the newest notifications plus its unread
//! count, kept in step with the store by refetching.

use crate::{
    core::events::{ChangeEvent, ChangeKind, EventBus, FeedSignal, FeedSubscription},
    entities::{Notification, NotificationType, notification},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Number of notifications shown in a feed unless configured otherwise.
pub const DEFAULT_FEED_LIMIT: u64 = 50;

/// A fetched window of notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPage {
    /// Newest first
    pub notifications: Vec<notification::Model>,
    /// Unread rows within `notifications` (not a global count)
    pub unread_count: usize,
}

/// Fields for a new notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Receiving user
    pub user_id: String,
    /// Product the message is about
    pub product_id: Option<i64>,
    /// Notification type
    pub notification_type: NotificationType,
    /// Headline
    pub title: String,
    /// Body
    pub message: String,
    /// Intended delivery time
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Fetches the user's newest notifications, at most `limit` of them.
#[instrument(skip(db))]
pub async fn fetch_recent(
    db: &DatabaseConnection,
    user_id: &str,
    limit: u64,
) -> Result<NotificationPage> {
    let notifications = Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    let unread_count = notifications.iter().filter(|n| !n.is_read).count();
    Ok(NotificationPage {
        notifications,
        unread_count,
    })
}

async fn find_owned(
    db: &DatabaseConnection,
    user_id: &str,
    notification_id: i64,
) -> Result<notification::Model> {
    Notification::find_by_id(notification_id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })
}

/// Inserts a notification and announces it.
pub async fn create_notification(
    db: &DatabaseConnection,
    events: &EventBus,
    new: NewNotification,
) -> Result<notification::Model> {
    if new.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "Notification title cannot be empty".to_string(),
        });
    }

    let inserted = notification::ActiveModel {
        user_id: Set(new.user_id),
        product_id: Set(new.product_id),
        notification_type: Set(new.notification_type),
        title: Set(new.title),
        message: Set(new.message),
        is_read: Set(false),
        scheduled_for: Set(new.scheduled_for),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    events.emit(ChangeEvent::new(
        &inserted.user_id,
        Some(inserted.id),
        ChangeKind::Insert,
    ));
    Ok(inserted)
}

/// Marks one notification as read. Calling it on an already read row is a no-op.
#[instrument(skip(db, events))]
pub async fn mark_as_read(
    db: &DatabaseConnection,
    events: &EventBus,
    user_id: &str,
    notification_id: i64,
) -> Result<notification::Model> {
    let existing = find_owned(db, user_id, notification_id).await?;
    if existing.is_read {
        return Ok(existing);
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    let updated = active.update(db).await?;

    events.emit(ChangeEvent::new(user_id, Some(notification_id), ChangeKind::Update));
    Ok(updated)
}

/// Marks every unread notification of the user as read. Returns the number of rows changed.
#[instrument(skip(db, events))]
pub async fn mark_all_as_read(
    db: &DatabaseConnection,
    events: &EventBus,
    user_id: &str,
) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        events.emit(ChangeEvent::new(user_id, None, ChangeKind::Update));
    }
    Ok(result.rows_affected)
}

/// Deletes a notification and returns the removed row.
#[instrument(skip(db, events))]
pub async fn delete_notification(
    db: &DatabaseConnection,
    events: &EventBus,
    user_id: &str,
    notification_id: i64,
) -> Result<notification::Model> {
    let existing = find_owned(db, user_id, notification_id).await?;
    Notification::delete_by_id(notification_id).exec(db).await?;

    events.emit(ChangeEvent::new(user_id, Some(notification_id), ChangeKind::Delete));
    Ok(existing)
}

/// Inserts a synthetic `info` notification dated now, for checking delivery end to end.
pub async fn generate_test(
    db: &DatabaseConnection,
    events: &EventBus,
    user_id: &str,
) -> Result<notification::Model> {
    create_notification(
        db,
        events,
        NewNotification {
            user_id: user_id.to_string(),
            product_id: None,
            notification_type: NotificationType::Info,
            title: "Test Notification".to_string(),
            message: "This is a test notification to verify the system is working.".to_string(),
            scheduled_for: Some(Utc::now()),
        },
    )
    .await
}

/// In-memory notification window for one user.
///
/// Local mutations adjust the unread count incrementally (never below zero); any change
/// coming from elsewhere is handled by refetching the whole window.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    user_id: String,
    limit: u64,
    notifications: Vec<notification::Model>,
    unread_count: usize,
}

impl NotificationFeed {
    /// Creates an empty feed; call [`Self::refresh`] to load it.
    #[must_use]
    pub fn new(user_id: &str, limit: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            limit,
            notifications: Vec::new(),
            unread_count: 0,
        }
    }

    /// User the feed belongs to.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Current window, newest first.
    #[must_use]
    pub fn notifications(&self) -> &[notification::Model] {
        &self.notifications
    }

    /// Unread notifications within the window.
    #[must_use]
    pub const fn unread_count(&self) -> usize {
        self.unread_count
    }

    fn apply_page(&mut self, page: NotificationPage) {
        let mut seen = HashSet::new();
        self.notifications = page
            .notifications
            .into_iter()
            .filter(|n| seen.insert(n.id))
            .collect();
        self.unread_count = self.notifications.iter().filter(|n| !n.is_read).count();
    }

    /// Replaces the window with a fresh fetch.
    pub async fn refresh(&mut self, db: &DatabaseConnection) -> Result<()> {
        let page = fetch_recent(db, &self.user_id, self.limit).await?;
        self.apply_page(page);
        Ok(())
    }

    /// Marks one notification read in the store and locally.
    pub async fn mark_as_read(
        &mut self,
        db: &DatabaseConnection,
        events: &EventBus,
        notification_id: i64,
    ) -> Result<()> {
        mark_as_read(db, events, &self.user_id, notification_id).await?;
        if let Some(local) = self
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            if !local.is_read {
                local.is_read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Marks everything read in the store and locally.
    pub async fn mark_all_as_read(
        &mut self,
        db: &DatabaseConnection,
        events: &EventBus,
    ) -> Result<u64> {
        let changed = mark_all_as_read(db, events, &self.user_id).await?;
        for local in &mut self.notifications {
            local.is_read = true;
        }
        self.unread_count = 0;
        Ok(changed)
    }

    /// Deletes a notification in the store and drops it locally.
    pub async fn delete(
        &mut self,
        db: &DatabaseConnection,
        events: &EventBus,
        notification_id: i64,
    ) -> Result<()> {
        delete_notification(db, events, &self.user_id, notification_id).await?;
        if let Some(pos) = self
            .notifications
            .iter()
            .position(|n| n.id == notification_id)
        {
            let removed = self.notifications.remove(pos);
            if !removed.is_read {
                self.unread_count = self.unread_count.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Creates a test notification and reloads the window.
    pub async fn generate_test(
        &mut self,
        db: &DatabaseConnection,
        events: &EventBus,
    ) -> Result<()> {
        generate_test(db, events, &self.user_id).await?;
        self.refresh(db).await
    }

    /// Waits for the next change to this user's notifications and refetches.
    ///
    /// Missed events (a lagging subscription) also trigger a full refetch. Returns
    /// `Ok(false)` once the change stream has closed.
    pub async fn sync(
        &mut self,
        db: &DatabaseConnection,
        subscription: &mut FeedSubscription,
    ) -> Result<bool> {
        if subscription.user_id() != self.user_id {
            return Err(Error::Validation {
                message: "Subscription belongs to a different user".to_string(),
            });
        }
        match subscription.next().await {
            FeedSignal::Changed(event) => {
                debug!("Feed change {:?}, refetching", event.kind);
                self.refresh(db).await?;
                Ok(true)
            }
            FeedSignal::Missed(count) => {
                debug!("Missed {} feed event(s), resynchronising", count);
                self.refresh(db).await?;
                Ok(true)
            }
            FeedSignal::Closed => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    async fn seed(
        db: &DatabaseConnection,
        events: &EventBus,
        user: &str,
        unread: usize,
        read: usize,
    ) -> Result<()> {
        for i in 0..unread + read {
            let created = create_notification(
                db,
                events,
                info_notification(user, &format!("Message {i}")),
            )
            .await?;
            if i >= unread {
                mark_as_read(db, events, user, created.id).await?;
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_recent_orders_newest_first_and_counts_window() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        seed(&db, &events, "alice", 4, 0).await?;
        seed(&db, &events, "bob", 2, 0).await?;

        let page = fetch_recent(&db, "alice", 3).await?;
        assert_eq!(page.notifications.len(), 3);
        assert_eq!(page.unread_count, 3);
        assert_eq!(page.notifications[0].title, "Message 3");
        assert!(page.notifications.iter().all(|n| n.user_id == "alice"));
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_all_as_read_five_unread_three_read() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        seed(&db, &events, "alice", 5, 3).await?;

        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);
        feed.refresh(&db).await?;
        assert_eq!(feed.unread_count(), 5);

        let changed = feed.mark_all_as_read(&db, &events).await?;
        assert_eq!(changed, 5);
        assert_eq!(feed.unread_count(), 0);

        let page = fetch_recent(&db, "alice", DEFAULT_FEED_LIMIT).await?;
        assert_eq!(page.notifications.len(), 8);
        assert!(page.notifications.iter().all(|n| n.is_read));
        Ok(())
    }

    #[tokio::test]
    async fn test_unread_count_never_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        seed(&db, &events, "alice", 2, 0).await?;

        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);
        feed.refresh(&db).await?;
        let first = feed.notifications()[0].id;
        let second = feed.notifications()[1].id;

        feed.mark_as_read(&db, &events, first).await?;
        feed.mark_as_read(&db, &events, first).await?;
        assert_eq!(feed.unread_count(), 1);

        feed.mark_all_as_read(&db, &events).await?;
        feed.mark_as_read(&db, &events, second).await?;
        assert_eq!(feed.unread_count(), 0);

        feed.delete(&db, &events, second).await?;
        assert_eq!(feed.unread_count(), 0);
        assert!(matches!(
            feed.delete(&db, &events, second).await.unwrap_err(),
            Error::NotificationNotFound { id: _ }
        ));
        assert_eq!(feed.unread_count(), 0);
        assert_eq!(feed.notifications().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unread_decrements() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        seed(&db, &events, "alice", 3, 0).await?;

        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);
        feed.refresh(&db).await?;
        let target = feed.notifications()[1].id;
        feed.delete(&db, &events, target).await?;

        assert_eq!(feed.unread_count(), 2);
        assert_eq!(feed.notifications().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_notification_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let bobs = create_notification(&db, &events, info_notification("bob", "hi")).await?;

        let result = mark_as_read(&db, &events, "alice", bobs.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotificationNotFound { id: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_test_refreshes_feed() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();

        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);
        feed.generate_test(&db, &events).await?;

        assert_eq!(feed.notifications().len(), 1);
        assert_eq!(feed.notifications()[0].notification_type, NotificationType::Info);
        assert!(feed.notifications()[0].scheduled_for.is_some());
        assert_eq!(feed.unread_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_refetches_on_external_insert_without_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let mut subscription = events.subscribe("alice");

        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);
        feed.refresh(&db).await?;

        create_notification(&db, &events, info_notification("bob", "not mine")).await?;
        create_notification(&db, &events, info_notification("alice", "Expiring soon")).await?;

        assert!(feed.sync(&db, &mut subscription).await?);
        assert_eq!(feed.notifications().len(), 1);

        // A second refetch racing the first must not duplicate rows
        feed.refresh(&db).await?;
        assert_eq!(feed.notifications().len(), 1);
        assert_eq!(feed.unread_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_resynchronises_after_missed_events() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::new(2);
        let mut subscription = events.subscribe("alice");
        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);

        for i in 0..5 {
            create_notification(&db, &events, info_notification("alice", &format!("n{i}"))).await?;
        }

        assert!(feed.sync(&db, &mut subscription).await?);
        assert_eq!(feed.notifications().len(), 5);
        assert_eq!(feed.unread_count(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_stops_when_stream_closes() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let mut subscription = events.subscribe("alice");
        drop(events);

        let mut feed = NotificationFeed::new("alice", DEFAULT_FEED_LIMIT);
        assert!(!feed.sync(&db, &mut subscription).await?);
        Ok(())
    }
}
