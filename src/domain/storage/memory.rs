//! In-memory store implementations for tests

use super::{EssayStore, NotificationStore, ReviewStore, StorageError};
use crate::domain::{
    Essay, EssayIdentifier, EssayRequest, Notification, NotificationIdentifier,
    NotificationRequest, Review, ReviewIdentifier, ReviewRequest, UserIdentifier,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryEssayStore {
    essays: Mutex<Vec<Essay>>,
    next_id: Mutex<EssayIdentifier>,
}

impl InMemoryEssayStore {
    fn next_id(&self) -> EssayIdentifier {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        *next_id
    }
}

#[async_trait]
impl EssayStore for InMemoryEssayStore {
    async fn add(&self, request: EssayRequest) -> Result<Essay, StorageError> {
        let id = self.next_id();
        let mut essays = self.essays.lock().unwrap();

        if essays.iter().any(|e| e.author == request.author) {
            return Err(StorageError::Duplicate(request.author));
        }

        let essay = Essay {
            id,
            content: request.content,
            author: request.author,
            created_at: Utc::now(),
        };

        essays.push(essay.clone());
        Ok(essay)
    }

    async fn list(&self) -> Result<Vec<Essay>, StorageError> {
        Ok(self.essays.lock().unwrap().clone())
    }

    async fn get_by_author(&self, author: &str) -> Result<Essay, StorageError> {
        self.essays
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.author == author)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn search_by_content(&self, term: &str) -> Result<Vec<Essay>, StorageError> {
        let term = term.to_lowercase();
        let mut matches: Vec<(usize, Essay)> = self
            .essays
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| {
                let occurrences = e.content.to_lowercase().matches(&term).count();
                (occurrences > 0).then(|| (occurrences, e.clone()))
            })
            .collect();

        matches.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(matches.into_iter().map(|(_, e)| e).collect())
    }

    async fn remove_by_author(&self, author: &str) -> Result<Essay, StorageError> {
        let mut essays = self.essays.lock().unwrap();
        let index = essays
            .iter()
            .position(|e| e.author == author)
            .ok_or(StorageError::NotFound)?;

        Ok(essays.remove(index))
    }
}

#[derive(Default)]
pub struct InMemoryReviewStore {
    reviews: Mutex<Vec<Review>>,
    next_id: Mutex<ReviewIdentifier>,
}

impl InMemoryReviewStore {
    fn next_id(&self) -> ReviewIdentifier {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        *next_id
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn add(&self, request: ReviewRequest) -> Result<Review, StorageError> {
        let review = Review {
            id: self.next_id(),
            essay_id: request.essay_id,
            rank: request.rank,
            content: request.content,
            author: request.author,
            created_at: Utc::now(),
        };

        self.reviews.lock().unwrap().push(review.clone());
        Ok(review)
    }

    async fn list(&self) -> Result<Vec<Review>, StorageError> {
        Ok(self.reviews.lock().unwrap().clone())
    }

    async fn list_by_essay(&self, essay_id: EssayIdentifier) -> Result<Vec<Review>, StorageError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.essay_id == essay_id)
            .cloned()
            .collect())
    }

    async fn remove(&self, review_id: ReviewIdentifier) -> Result<Review, StorageError> {
        let mut reviews = self.reviews.lock().unwrap();
        let index = reviews
            .iter()
            .position(|r| r.id == review_id)
            .ok_or(StorageError::NotFound)?;

        Ok(reviews.remove(index))
    }
}

#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: Mutex<Vec<Notification>>,
    next_id: Mutex<NotificationIdentifier>,
}

impl InMemoryNotificationStore {
    fn next_id(&self) -> NotificationIdentifier {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        *next_id
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, request: NotificationRequest) -> Result<Notification, StorageError> {
        let notification = Notification {
            id: self.next_id(),
            recipient: request.recipient,
            content: request.content,
            read: false,
            created_at: Utc::now(),
        };

        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn list_by_recipient(
        &self,
        recipient: UserIdentifier,
    ) -> Result<Vec<Notification>, StorageError> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect();

        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }

    async fn mark_read(
        &self,
        notification_id: NotificationIdentifier,
    ) -> Result<(), StorageError> {
        let mut notifications = self.notifications.lock().unwrap();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or(StorageError::NotFound)?;

        notification.read = true;
        Ok(())
    }

    async fn mark_all_read(&self, recipient: UserIdentifier) -> Result<u64, StorageError> {
        let mut updated = 0;

        for notification in self.notifications.lock().unwrap().iter_mut() {
            if notification.recipient == recipient && !notification.read {
                notification.read = true;
                updated += 1;
            }
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn mark_read_idempotently() {
        let store = InMemoryNotificationStore::default();
        let notification = store
            .create(NotificationRequest {
                recipient: 1,
                content: "hello".into(),
            })
            .await
            .unwrap();

        store.mark_read(notification.id).await.unwrap();
        store.mark_read(notification.id).await.unwrap();

        let notifications = store.list_by_recipient(1).await.unwrap();
        assert!(notifications[0].read);
    }

    #[tokio::test]
    async fn reject_marking_unknown_notifications() {
        let store = InMemoryNotificationStore::default();

        assert!(matches!(
            store.mark_read(42).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn count_matched_rows_when_marking_all() {
        let store = InMemoryNotificationStore::default();

        for content in ["one", "two"] {
            store
                .create(NotificationRequest {
                    recipient: 1,
                    content: content.into(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.mark_all_read(1).await.unwrap(), 2);
        // Everything is read already, so a second run matches nothing
        assert_eq!(store.mark_all_read(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn keep_reviews_in_insertion_order() {
        let store = InMemoryReviewStore::default();

        for (rank, author) in [(1, "alice"), (3, "bob")] {
            store
                .add(ReviewRequest {
                    essay_id: 1,
                    rank,
                    content: "review".into(),
                    author: author.into(),
                })
                .await
                .unwrap();
        }

        let reviews = store.list_by_essay(1).await.unwrap();
        let authors: Vec<&str> = reviews.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn refuse_second_essays_per_author() {
        let store = InMemoryEssayStore::default();

        store
            .add(EssayRequest {
                content: "first".into(),
                author: "alice".into(),
            })
            .await
            .unwrap();

        assert!(matches!(
            store
                .add(EssayRequest {
                    content: "second".into(),
                    author: "alice".into(),
                })
                .await,
            Err(StorageError::Duplicate(_))
        ));
    }
}
