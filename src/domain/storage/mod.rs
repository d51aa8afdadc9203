//! Narrow persistence contracts consumed by the service modules
//!
//! The stores are deliberately thin collaborators: ordinary keyed reads and writes,
//! fully materialized result lists, no cursors. Streaming towards clients happens
//! purely at the transport layer on top of these lists.

use crate::domain::{
    Essay, EssayIdentifier, EssayRequest, Notification, NotificationIdentifier,
    NotificationRequest, Review, ReviewIdentifier, ReviewRequest, UserIdentifier,
};
use crate::library::BoxedError;
use async_trait::async_trait;
use thiserror::Error;

pub mod mongo;

#[cfg(test)]
#[allow(missing_docs)]
pub mod memory;

/// Failure modes of the persistence collaborators
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record matched the given key
    #[error("record not found")]
    NotFound,
    /// A uniqueness constraint would be violated
    #[error("record already exists: {0}")]
    Duplicate(String),
    /// The storage backend failed
    #[error("storage backend failure")]
    Backend(#[source] BoxedError),
}

impl From<mongodb::error::Error> for StorageError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Backend(e.into())
    }
}

/// Store holding published essays
#[async_trait]
pub trait EssayStore: Send + Sync {
    /// Persists a new essay; each author may hold at most one
    async fn add(&self, request: EssayRequest) -> Result<Essay, StorageError>;

    /// Returns every essay in insertion order
    async fn list(&self) -> Result<Vec<Essay>, StorageError>;

    /// Returns the essay published by the given author
    async fn get_by_author(&self, author: &str) -> Result<Essay, StorageError>;

    /// Returns essays whose content resembles the term, most similar first
    ///
    /// Ranking is delegated to the backend's similarity machinery.
    async fn search_by_content(&self, term: &str) -> Result<Vec<Essay>, StorageError>;

    /// Removes and returns the essay published by the given author
    async fn remove_by_author(&self, author: &str) -> Result<Essay, StorageError>;
}

/// Store holding peer reviews
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persists a new review
    async fn add(&self, request: ReviewRequest) -> Result<Review, StorageError>;

    /// Returns every review in insertion order
    async fn list(&self) -> Result<Vec<Review>, StorageError>;

    /// Returns all reviews of one essay in insertion order
    async fn list_by_essay(&self, essay_id: EssayIdentifier) -> Result<Vec<Review>, StorageError>;

    /// Removes and returns the given review
    async fn remove(&self, review_id: ReviewIdentifier) -> Result<Review, StorageError>;
}

/// Store holding user notifications
///
/// The notifier module exclusively owns writes to this store.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persists a new, unread notification
    async fn create(&self, request: NotificationRequest) -> Result<Notification, StorageError>;

    /// Returns all notifications of one recipient, newest first
    async fn list_by_recipient(
        &self,
        recipient: UserIdentifier,
    ) -> Result<Vec<Notification>, StorageError>;

    /// Marks one notification as read
    ///
    /// Idempotent: marking an already-read notification succeeds. Unknown
    /// identifiers yield [`StorageError::NotFound`].
    async fn mark_read(&self, notification_id: NotificationIdentifier)
        -> Result<(), StorageError>;

    /// Marks every unread notification of the recipient as read and returns
    /// how many were matched (zero matches is not an error)
    async fn mark_all_read(&self, recipient: UserIdentifier) -> Result<u64, StorageError>;
}
