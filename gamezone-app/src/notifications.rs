//! Toast notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }
}

/// Bounded queue, oldest dropped first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Notifications {
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        if self.items.len() == MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    pub fn dismiss(&mut self, index: usize) -> Option<Notification> {
        self.items.remove(index)
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.items.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_queue_drops_oldest() {
        let mut queue = Notifications::new();
        for i in 0..(MAX_NOTIFICATIONS + 3) {
            queue.push(Notification::info("n", i.to_string()));
        }
        assert_eq!(queue.len(), MAX_NOTIFICATIONS);
        assert_eq!(queue.iter().next().unwrap().message, "3");
        assert_eq!(queue.latest().unwrap().message, (MAX_NOTIFICATIONS + 2).to_string());
    }

    #[test]
    fn test_dismiss_and_drain() {
        let mut queue = Notifications::new();
        queue.push(Notification::success("Saved", "Game created"));
        queue.push(Notification::error("Failed", "Network error"));
        let dismissed = queue.dismiss(0).unwrap();
        assert_eq!(dismissed.level, NotificationLevel::Success);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }
}
