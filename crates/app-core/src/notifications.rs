//! Notification inbox
//!
//! This module keeps the notification list shown to students and parents,
//! filters it by read state and marks items read both locally and on the
//! portal.

use chrono::{DateTime, Utc};
use portal_client::api::ApiError;
use portal_client::types::Notification;
use portal_client::PortalApi;
use serde::{Deserialize, Serialize};

/// Result type for inbox operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Which notifications to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFilter {
    /// Everything
    #[default]
    All,
    /// Unread only
    Unread,
}

/// Short relative age such as "2 hours ago"
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);

    let (count, unit) = if elapsed.num_minutes() < 1 {
        return "Just now".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_weeks() < 1 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_weeks(), "week")
    } else {
        return created_at.format("%b %d").to_string();
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// The signed-in user's notifications
#[derive(Debug, Clone, Default)]
pub struct NotificationInbox {
    items: Vec<Notification>,
    filter: NotificationFilter,
}

impl NotificationInbox {
    /// Inbox over already fetched notifications
    pub fn new(items: Vec<Notification>) -> Self {
        Self {
            items,
            filter: NotificationFilter::All,
        }
    }

    /// Replace the list with the portal's current inbox
    pub async fn refresh(&mut self, api: &dyn PortalApi) -> Result<usize> {
        let items = api.fetch_notifications().await?;
        tracing::debug!(count = items.len(), "Fetched notifications");
        self.items = items;
        Ok(self.items.len())
    }

    /// All notifications
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Active filter
    pub fn filter(&self) -> NotificationFilter {
        self.filter
    }

    /// Change the filter
    pub fn set_filter(&mut self, filter: NotificationFilter) {
        self.filter = filter;
    }

    /// Notifications passing the active filter
    pub fn visible(&self) -> Vec<&Notification> {
        self.items
            .iter()
            .filter(|n| self.filter == NotificationFilter::All || !n.is_read)
            .collect()
    }

    /// Number of unread notifications
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Mark a notification read locally; returns whether it changed
    pub fn mark_read_local(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.is_read => {
                notification.is_read = true;
                true
            }
            _ => false,
        }
    }

    /// Mark every notification read locally
    pub fn mark_all_read_local(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.is_read) {
            notification.is_read = true;
            changed += 1;
        }
        changed
    }

    /// Mark a notification read on the portal, then locally
    ///
    /// Already-read or unknown ids do not reach the portal.
    pub async fn mark_read(&mut self, api: &dyn PortalApi, id: &str) -> Result<bool> {
        let unread = self.items.iter().any(|n| n.id == id && !n.is_read);
        if !unread {
            return Ok(false);
        }

        api.mark_notification_read(id).await?;
        Ok(self.mark_read_local(id))
    }
}
