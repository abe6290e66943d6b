//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`BehaviorEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.
//! Delivery is at-least-once from the engine's point of view (handlers
//! may also be invoked directly, e.g. by the admin re-evaluation
//! endpoint), which is safe because progress evaluation is idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stride_core::types::DbId;
use tokio::sync::broadcast;

/// A behavior-derived event the achievement engine reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BehaviorEvent {
    /// A behavior record was written for this subject.
    Recorded {
        user_id: DbId,
        /// Minutes logged by the triggering record. Informational only;
        /// the engine recomputes aggregates from the database.
        duration_minutes: i64,
        timestamp: DateTime<Utc>,
    },
    /// Time-dependent conditions (streaks) should be re-checked.
    Reevaluate { user_id: DbId },
}

impl BehaviorEvent {
    /// The subject this event concerns.
    pub fn user_id(&self) -> DbId {
        match self {
            BehaviorEvent::Recorded { user_id, .. } | BehaviorEvent::Reevaluate { user_id } => {
                *user_id
            }
        }
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`BehaviorEvent`]. Publishing
/// with no live subscriber is not an error; the event is simply dropped
/// (the engine listener is started before the server accepts traffic).
pub struct EventBus {
    sender: broadcast::Sender<BehaviorEvent>,
}

impl EventBus {
    /// Create a bus with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: BehaviorEvent) {
        let receivers = self.sender.receiver_count();
        if let Err(e) = self.sender.send(event) {
            // Only fails when there are no subscribers at all.
            tracing::debug!(receivers, error = %e, "Event published with no subscribers");
        }
    }

    /// Subscribe to all subsequently published events.
    pub fn subscribe(&self) -> broadcast::Receiver<BehaviorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
