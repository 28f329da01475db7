//! Realtime notification hub.
//!
//! A process-wide broadcast channel fans freshly persisted notifications
//! out to every connected SSE subscriber. Publishing never blocks and
//! never fails: with no listeners the event is dropped, and the row is
//! still in the database for the next list call.

use domain::models::Notification;
use tokio::sync::broadcast;

use crate::middleware::metrics::record_notification_published;

/// Default channel capacity per subscriber before laggards skip ahead.
pub const DEFAULT_HUB_CAPACITY: usize = 256;

/// Broadcast hub shared through application state.
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    /// Create a hub whose channel buffers `capacity` events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a persisted notification to all connected subscribers.
    pub fn publish(&self, notification: &Notification) {
        record_notification_published();
        // Send only errors when no receiver exists; the row outlives the event.
        let _ = self.tx.send(notification.clone());
    }

    /// Open a subscription positioned after the latest published event.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn notification(user_id: Uuid) -> Notification {
        Notification {
            id: 1,
            user_id,
            message: "New registration from Jane Doe".to_string(),
            link: Some("/submissions".to_string()),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let hub = NotificationHub::new(8);
        let mut rx = hub.subscribe();
        let user_id = Uuid::new_v4();
        hub.publish(&notification(user_id));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id, user_id);
        assert_eq!(received.message, "New registration from Jane Doe");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let hub = NotificationHub::new(8);
        // Must not panic or error even though nobody listens.
        hub.publish(&notification(Uuid::new_v4()));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_only_sees_events_after_subscribing() {
        let hub = NotificationHub::new(8);
        hub.publish(&notification(Uuid::new_v4()));
        let mut rx = hub.subscribe();
        let late = Uuid::new_v4();
        hub.publish(&notification(late));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id, late);
    }
}
