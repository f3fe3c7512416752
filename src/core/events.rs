//! Change stream for notification rows.
//!
//! Every write to the `notifications` table publishes a [`ChangeEvent`] on the
//! [`EventBus`]. Subscribers only see events for their own user. An event carries no
//! usable payload beyond "something changed": receivers refetch instead of patching.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

/// What happened to a notification row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A row was created
    Insert,
    /// A row was modified (read state)
    Update,
    /// A row was removed
    Delete,
}

/// A single change to a user's notification rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// User whose feed changed
    pub user_id: String,
    /// Row that changed, when a single row is affected
    pub notification_id: Option<i64>,
    /// Kind of change
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Convenience constructor.
    #[must_use]
    pub fn new(user_id: &str, notification_id: Option<i64>, kind: ChangeKind) -> Self {
        Self {
            user_id: user_id.to_string(),
            notification_id,
            kind,
        }
    }
}

/// Broadcast bus shared by the core and every live feed.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Creates a bus that buffers up to `capacity` events per slow subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn emit(&self, event: ChangeEvent) {
        if self.sender.send(event).is_err() {
            debug!("Change event dropped: no subscribers");
        }
    }

    /// Subscribes to changes of one user's notifications.
    #[must_use]
    pub fn subscribe(&self, user_id: &str) -> FeedSubscription {
        FeedSubscription {
            user_id: user_id.to_string(),
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Outcome of waiting on a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSignal {
    /// An event for this user arrived
    Changed(ChangeEvent),
    /// Events were dropped while we were not listening; a full resync is required
    Missed(u64),
    /// The bus has shut down
    Closed,
}

/// A receiver scoped to a single user's rows.
#[derive(Debug)]
pub struct FeedSubscription {
    user_id: String,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl FeedSubscription {
    /// User this subscription is scoped to.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Waits for the next event that concerns this user.
    pub async fn next(&mut self) -> FeedSignal {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.user_id == self.user_id => return FeedSignal::Changed(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => return FeedSignal::Missed(missed),
                Err(RecvError::Closed) => return FeedSignal::Closed,
            }
        }
    }
}
