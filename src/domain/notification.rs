use super::{NotificationIdentifier, UserIdentifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification delivered to a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Unique identifier, assigned by the store
    pub id: NotificationIdentifier,

    /// User the notification is addressed to
    pub recipient: UserIdentifier,

    /// Human readable message
    pub content: String,

    /// Whether the recipient has marked the notification as read
    pub read: bool,

    /// Time at which the notification was stored
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRequest {
    /// User the notification is addressed to
    pub recipient: UserIdentifier,

    /// Human readable message
    pub content: String,
}
