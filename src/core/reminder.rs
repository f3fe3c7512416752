//! Reminder scheduling and promotion.
//!
//! Reminders are materialised when a product is saved: one per tracked date, dated
//! `lead` days before it. Lead times are always passed in explicitly. Scheduling is an
//! upsert keyed on `(product_id, reminder_type)`, so saving the same product twice never
//! produces a second reminder.
//!
//! Promotion is the other half: once a reminder's date is reached it is turned into a
//! notification exactly once and flagged as sent.

use crate::{
    core::{
        events::{ChangeEvent, ChangeKind, EventBus},
        settings::LeadTimes,
        status,
    },
    entities::{Product, Reminder, ReminderType, notification, product, reminder},
    errors::Result,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// A reminder that should exist for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPlan {
    /// Tracked date kind
    pub reminder_type: ReminderType,
    /// Day on which the reminder is due
    pub reminder_date: NaiveDate,
    /// Lead time used
    pub days_before: i32,
}

fn plan_one(
    reminder_type: ReminderType,
    date: NaiveDate,
    days_before: i32,
) -> Option<ReminderPlan> {
    let reminder_date = date.checked_sub_signed(Duration::days(i64::from(days_before)));
    if reminder_date.is_none() {
        warn!("Reminder date out of range for {:?} on {}", reminder_type, date);
    }
    reminder_date.map(|reminder_date| ReminderPlan {
        reminder_type,
        reminder_date,
        days_before,
    })
}

/// Works out which reminders a product with these dates should have.
///
/// Reminder dates that are already in the past are still planned; deciding when to fire
/// is left to [`promote_due_reminders`].
#[must_use]
pub fn plan_reminders(
    expiry_date: Option<NaiveDate>,
    warranty_date: Option<NaiveDate>,
    lead: LeadTimes,
) -> Vec<ReminderPlan> {
    [
        expiry_date.and_then(|d| plan_one(ReminderType::Expiry, d, lead.expiry_days)),
        warranty_date.and_then(|d| plan_one(ReminderType::Warranty, d, lead.warranty_days)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Brings the stored reminders of `product` in line with its dates.
///
/// - an unchanged plan leaves the existing row untouched (including `is_sent`)
/// - a changed date or lead time updates the row and re-arms it
/// - a date that was removed, or a consumed product, drops the reminder
///
/// All changes happen in one database transaction.
#[instrument(skip(db, product), fields(product_id = product.id))]
pub async fn schedule_reminders(
    db: &DatabaseConnection,
    product: &product::Model,
    lead: LeadTimes,
) -> Result<Vec<reminder::Model>> {
    let plans = if product.is_consumed {
        Vec::new()
    } else {
        plan_reminders(product.expiry_date, product.warranty_date, lead)
    };

    let txn = db.begin().await?;

    let existing = Reminder::find()
        .filter(reminder::Column::ProductId.eq(product.id))
        .all(&txn)
        .await?;

    let mut scheduled = Vec::with_capacity(plans.len());
    for plan in &plans {
        let current = existing
            .iter()
            .find(|r| r.reminder_type == plan.reminder_type);

        let model = match current {
            Some(r)
                if r.reminder_date == plan.reminder_date && r.days_before == plan.days_before =>
            {
                r.clone()
            }
            Some(r) => {
                debug!("Rescheduling {:?} reminder to {}", plan.reminder_type, plan.reminder_date);
                let mut active: reminder::ActiveModel = r.clone().into();
                active.reminder_date = Set(plan.reminder_date);
                active.days_before = Set(plan.days_before);
                active.is_sent = Set(false);
                active.update(&txn).await?
            }
            None => {
                reminder::ActiveModel {
                    user_id: Set(product.user_id.clone()),
                    product_id: Set(product.id),
                    reminder_type: Set(plan.reminder_type),
                    reminder_date: Set(plan.reminder_date),
                    days_before: Set(plan.days_before),
                    is_sent: Set(false),
                    created_at: Set(chrono::Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };
        scheduled.push(model);
    }

    let stale: Vec<i64> = existing
        .iter()
        .filter(|r| !plans.iter().any(|p| p.reminder_type == r.reminder_type))
        .map(|r| r.id)
        .collect();
    if !stale.is_empty() {
        Reminder::delete_many()
            .filter(reminder::Column::Id.is_in(stale))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(scheduled)
}

/// Lists a product's reminders, expiry first.
pub async fn get_reminders_for_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<reminder::Model>> {
    Reminder::find()
        .filter(reminder::Column::ProductId.eq(product_id))
        .order_by_asc(reminder::Column::ReminderType)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a user's reminders that have not fired yet, soonest first.
pub async fn get_pending_reminders(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<reminder::Model>> {
    Reminder::find()
        .filter(reminder::Column::UserId.eq(user_id))
        .filter(reminder::Column::IsSent.eq(false))
        .order_by_asc(reminder::Column::ReminderDate)
        .all(db)
        .await
        .map_err(Into::into)
}

fn reminder_text(
    reminder_type: ReminderType,
    product_name: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> (String, String) {
    let days = status::days_remaining(date, today);
    let when = match days {
        d if d < 0 => format!("{} day(s) ago", -d),
        0 => "today".to_string(),
        d => format!("in {d} day(s)"),
    };
    match reminder_type {
        ReminderType::Expiry => (
            format!("{product_name} is expiring"),
            format!("{product_name} expires on {date} ({when})."),
        ),
        ReminderType::Warranty => (
            format!("Warranty ending for {product_name}"),
            format!("The warranty for {product_name} ends on {date} ({when})."),
        ),
    }
}

/// Turns every due, unsent reminder into a notification and marks it sent.
///
/// A reminder is due once `reminder_date <= today`. Due reminders of consumed products,
/// or whose tracked date is gone, are marked sent without a notification so later runs
/// skip them. Running this twice on the same day creates nothing the second time.
#[instrument(skip(db, events))]
pub async fn promote_due_reminders(
    db: &DatabaseConnection,
    events: &EventBus,
    today: NaiveDate,
) -> Result<Vec<notification::Model>> {
    let txn = db.begin().await?;

    let due = Reminder::find()
        .filter(reminder::Column::IsSent.eq(false))
        .filter(reminder::Column::ReminderDate.lte(today))
        .order_by_asc(reminder::Column::ReminderDate)
        .find_also_related(Product)
        .all(&txn)
        .await?;

    let mut created = Vec::new();
    let mut skipped = Vec::new();
    for (due_reminder, owner_product) in due {
        let tracked = owner_product.filter(|p| !p.is_consumed).and_then(|p| {
            let date = match due_reminder.reminder_type {
                ReminderType::Expiry => p.expiry_date,
                ReminderType::Warranty => p.warranty_date,
            };
            date.map(|d| (p, d))
        });
        let Some((owner_product, tracked_date)) = tracked else {
            skipped.push(due_reminder.id);
            continue;
        };

        let (title, message) =
            reminder_text(due_reminder.reminder_type, &owner_product.name, tracked_date, today);
        let scheduled_for = due_reminder
            .reminder_date
            .and_time(NaiveTime::MIN)
            .and_utc();

        let inserted = notification::ActiveModel {
            user_id: Set(due_reminder.user_id.clone()),
            product_id: Set(Some(owner_product.id)),
            notification_type: Set(due_reminder.reminder_type.into()),
            title: Set(title),
            message: Set(message),
            is_read: Set(false),
            scheduled_for: Set(Some(scheduled_for)),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut sent: reminder::ActiveModel = due_reminder.into();
        sent.is_sent = Set(true);
        sent.update(&txn).await?;

        created.push(inserted);
    }

    if !skipped.is_empty() {
        debug!("Retiring {} due reminder(s) with nothing to notify", skipped.len());
        Reminder::update_many()
            .col_expr(reminder::Column::IsSent, Expr::value(true))
            .filter(reminder::Column::Id.is_in(skipped))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    for note in &created {
        events.emit(ChangeEvent::new(&note.user_id, Some(note.id), ChangeKind::Insert));
    }
    if !created.is_empty() {
        info!("Promoted {} due reminder(s) to notifications", created.len());
    }
    Ok(created)
}

/// Runs [`promote_due_reminders`] for the current UTC day every `period`, forever.
///
/// Failures are logged and retried on the next tick.
pub async fn run_promotion_loop(
    db: DatabaseConnection,
    events: EventBus,
    period: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        if let Err(e) = promote_due_reminders(&db, &events, status::today()).await {
            warn!("Reminder promotion failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::product;
    use crate::test_utils::*;
    use chrono::Duration;

    fn lead(expiry_days: i32, warranty_days: i32) -> LeadTimes {
        LeadTimes {
            expiry_days,
            warranty_days,
        }
    }

    #[test]
    fn test_plan_without_dates_is_empty() {
        assert!(plan_reminders(None, None, LeadTimes::default()).is_empty());
    }

    #[test]
    fn test_plan_uses_respective_lead_times() {
        let expiry = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let warranty = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();

        let plans = plan_reminders(Some(expiry), Some(warranty), lead(7, 30));
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].reminder_type, ReminderType::Expiry);
        assert_eq!(plans[0].reminder_date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(plans[0].days_before, 7);
        assert_eq!(plans[1].reminder_type, ReminderType::Warranty);
        assert_eq!(plans[1].reminder_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(plans[1].days_before, 30);
    }

    #[tokio::test]
    async fn test_expiry_in_five_days_schedules_reminder_two_days_ago() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();

        let expiry = Some(today + Duration::days(5));
        let saved = create_product_with_dates(&db, "alice", "Milk", expiry, None).await?;

        let reminders = get_reminders_for_product(&db, saved.id).await?;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].reminder_type, ReminderType::Expiry);
        assert_eq!(reminders[0].reminder_date, today - Duration::days(2));
        assert_eq!(reminders[0].days_before, 7);
        assert!(!reminders[0].is_sent);
        Ok(())
    }

    #[tokio::test]
    async fn test_scheduling_twice_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();
        let saved = create_product_with_dates(
            &db,
            "alice",
            "Laptop",
            Some(today + Duration::days(40)),
            Some(today + Duration::days(400)),
        )
        .await?;

        let first = schedule_reminders(&db, &saved, LeadTimes::default()).await?;
        let second = schedule_reminders(&db, &saved, LeadTimes::default()).await?;

        assert_eq!(first, second);
        let stored = get_reminders_for_product(&db, saved.id).await?;
        assert_eq!(stored.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_changed_date_updates_and_rearms_reminder() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();
        let saved =
            create_product_with_dates(&db, "alice", "Yogurt", Some(today + Duration::days(3)), None)
                .await?;

        let events = EventBus::default();
        let promoted = promote_due_reminders(&db, &events, today).await?;
        assert_eq!(promoted.len(), 1);

        let mut moved = saved.clone();
        moved.expiry_date = Some(today + Duration::days(30));
        let rescheduled = schedule_reminders(&db, &moved, LeadTimes::default()).await?;

        assert_eq!(rescheduled.len(), 1);
        assert_eq!(rescheduled[0].reminder_date, today + Duration::days(23));
        assert!(!rescheduled[0].is_sent);
        assert_eq!(get_reminders_for_product(&db, saved.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_removed_date_drops_reminder() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();
        let saved = create_product_with_dates(
            &db,
            "alice",
            "Kettle",
            Some(today + Duration::days(100)),
            Some(today + Duration::days(700)),
        )
        .await?;

        let mut without_expiry = saved.clone();
        without_expiry.expiry_date = None;
        let remaining = schedule_reminders(&db, &without_expiry, LeadTimes::default()).await?;

        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].reminder_type, ReminderType::Warranty);
        assert_eq!(get_reminders_for_product(&db, saved.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_promotion_is_idempotent_and_skips_future() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let today = status::today();

        let soon = Some(today + Duration::days(2));
        let due = create_product_with_dates(&db, "alice", "Bread", soon, None).await?;
        create_product_with_dates(&db, "alice", "Rice", Some(today + Duration::days(200)), None)
            .await?;

        let first = promote_due_reminders(&db, &events, today).await?;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].product_id, Some(due.id));
        assert_eq!(first[0].notification_type, notification::NotificationType::Expiry);
        assert!(first[0].message.contains("Bread"));

        let second = promote_due_reminders(&db, &events, today).await?;
        assert!(second.is_empty());

        assert!(get_pending_reminders(&db, "alice").await?.len() == 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_consumed_products_are_not_promoted() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let today = status::today();

        let tomorrow = Some(today + Duration::days(1));
        let saved = create_product_with_dates(&db, "alice", "Cheese", tomorrow, None).await?;
        product::mark_consumed(&db, "alice", &[saved.id]).await?;

        let promoted = promote_due_reminders(&db, &events, today).await?;
        assert!(promoted.is_empty());

        // Retired, so later runs no longer pick it up
        let stored = get_reminders_for_product(&db, saved.id).await?;
        assert_eq!(stored.len(), 1);
        assert!(stored[0].is_sent);
        Ok(())
    }

    #[tokio::test]
    async fn test_promotion_publishes_insert_events() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let mut sub = events.subscribe("alice");
        let today = status::today();

        create_product_with_dates(&db, "alice", "Eggs", Some(today), None).await?;
        let promoted = promote_due_reminders(&db, &events, today).await?;

        match sub.next().await {
            crate::core::events::FeedSignal::Changed(event) => {
                assert_eq!(event.kind, ChangeKind::Insert);
                assert_eq!(event.notification_id, Some(promoted[0].id));
            }
            other => panic!("unexpected signal {other:?}"),
        }
        Ok(())
    }
}
