use crate::constants::QUEUE_SIZE_REQUESTS;
use crate::domain::{Notification, NotificationIdentifier, UserIdentifier};
use crate::library::communication::event::{self, QueueDescriptor};
use crate::library::communication::request::{Request, ResponseLocation, StreamingRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LIST_QUEUE_KEY: &str = "notification.list";
const MARK_READ_QUEUE_KEY: &str = "notification.mark-read";
const MARK_ALL_READ_QUEUE_KEY: &str = "notification.mark-all-read";

/// Request for all notifications of one recipient, newest first
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct NotificationListRequest {
    /// Recipient whose notifications are requested
    pub recipient: UserIdentifier,

    response_location: ResponseLocation,
}

impl NotificationListRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(recipient: UserIdentifier) -> Self {
        Self {
            recipient,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for NotificationListRequest {
    fn eq(&self, other: &Self) -> bool {
        self.recipient == other.recipient
    }
}

impl event::Notification for NotificationListRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(LIST_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl StreamingRequest for NotificationListRequest {
    type Item = Notification;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request to mark a single notification as read
///
/// Marking is idempotent: marking an already-read notification succeeds.
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct MarkReadRequest {
    /// The notification to mark
    pub notification_id: NotificationIdentifier,

    response_location: ResponseLocation,
}

impl MarkReadRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(notification_id: NotificationIdentifier) -> Self {
        Self {
            notification_id,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for MarkReadRequest {
    fn eq(&self, other: &Self) -> bool {
        self.notification_id == other.notification_id
    }
}

/// Response to a [`MarkReadRequest`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkReadResponse {
    /// Whether the notification existed and is now marked as read
    pub success: bool,
}

impl event::Notification for MarkReadRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(MARK_READ_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for MarkReadRequest {
    type Response = MarkReadResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request to mark every notification of a recipient as read
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct MarkAllReadRequest {
    /// Recipient whose notifications are marked
    pub recipient: UserIdentifier,

    response_location: ResponseLocation,
}

impl MarkAllReadRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(recipient: UserIdentifier) -> Self {
        Self {
            recipient,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for MarkAllReadRequest {
    fn eq(&self, other: &Self) -> bool {
        self.recipient == other.recipient
    }
}

/// Response to a [`MarkAllReadRequest`]
///
/// A run against a recipient without unread notifications is still a success;
/// the `updated` count is what distinguishes it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkAllReadResponse {
    /// Whether the update ran to completion
    pub success: bool,

    /// Number of notifications that matched and were marked
    pub updated: u64,
}

impl event::Notification for MarkAllReadRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(MARK_ALL_READ_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for MarkAllReadRequest {
    type Response = MarkAllReadResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}
