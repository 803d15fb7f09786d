//! Notification bus.
//!
//! Components publish user-facing notices (login recorded, location lookup
//! degraded, ...) to a `NotificationBus` handed to them at construction.
//! Consumers hold a `Subscription` for as long as they want notices; dropping
//! it unsubscribes.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::config::NOTIFICATION_CHANNEL_CAPACITY;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

/// Cloneable handle; all clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(NOTIFICATION_CHANNEL_CAPACITY)
    }

    /// `capacity` bounds how many notices a slow subscriber may fall behind
    /// before the oldest are dropped for it.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        NotificationBus { sender }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Delivers a notice to every live subscriber and returns how many there were.
    pub fn publish(&self, level: NoticeLevel, message: impl Into<String>) -> usize {
        let notification = Notification {
            level,
            message: message.into(),
        };
        // send only fails when nobody is subscribed
        self.sender.send(notification).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration on a `NotificationBus`.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Notification>,
}

impl Subscription {
    /// Waits for the next notice. Returns `None` once every bus handle is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("Notification subscriber lagged, skipped {skipped} notice(s)");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next pending notice without waiting.
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => return Some(notification),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = NotificationBus::new();
        assert_eq!(bus.publish(NoticeLevel::Info, "nobody listening"), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = NotificationBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(NoticeLevel::Success, "Login recorded"), 2);

        let expected = Notification {
            level: NoticeLevel::Success,
            message: "Login recorded".to_string(),
        };
        assert_eq!(first.recv().await, Some(expected.clone()));
        assert_eq!(second.recv().await, Some(expected));
    }

    #[test]
    fn test_unsubscribe_and_drop_end_delivery() {
        let bus = NotificationBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(second);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(NoticeLevel::Error, "late"), 0);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_notices() {
        let bus = NotificationBus::new();
        let mut early = bus.subscribe();
        bus.publish(NoticeLevel::Info, "one");
        let mut late = bus.subscribe();
        bus.publish(NoticeLevel::Info, "two");

        assert_eq!(early.try_recv().map(|n| n.message), Some("one".into()));
        assert_eq!(early.try_recv().map(|n| n.message), Some("two".into()));
        assert_eq!(late.try_recv().map(|n| n.message), Some("two".into()));
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn test_lagging_subscriber_keeps_newest() {
        let bus = NotificationBus::with_capacity(2);
        let mut sub = bus.subscribe();
        for i in 0..5 {
            bus.publish(NoticeLevel::Info, format!("n{i}"));
        }
        assert_eq!(sub.try_recv().map(|n| n.message), Some("n3".into()));
        assert_eq!(sub.try_recv().map(|n| n.message), Some("n4".into()));
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn test_recv_returns_none_when_bus_dropped() {
        let bus = NotificationBus::new();
        let mut sub = bus.subscribe();
        drop(bus);
        assert_eq!(sub.recv().await, None);
    }
}
