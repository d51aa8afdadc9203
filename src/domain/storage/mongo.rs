//! [`MongoDB`](mongodb) backed implementations of the store contracts
//!
//! Identifiers are monotonic per record type, drawn from a shared `counters`
//! collection with an `$inc` upsert. Timestamps are assigned here, at the store.

use super::{EssayStore, NotificationStore, ReviewStore, StorageError};
use crate::domain::{
    Essay, EssayIdentifier, EssayRequest, Notification, NotificationIdentifier,
    NotificationRequest, Review, ReviewIdentifier, ReviewRequest, UserIdentifier,
};
use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

const ESSAY_COUNTER: &str = "essays";
const REVIEW_COUNTER: &str = "reviews";
const NOTIFICATION_COUNTER: &str = "notifications";

/// Counter record providing monotonic identifiers
#[derive(Debug, Serialize, Deserialize)]
pub struct CounterDocument {
    #[serde(rename = "_id")]
    name: String,
    value: i64,
}

async fn next_identifier(
    counters: &Collection<CounterDocument>,
    name: &str,
) -> Result<i64, StorageError> {
    let options = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();

    let counter = counters
        .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "value": 1i64 } }, options)
        .await?
        .ok_or(StorageError::NotFound)?;

    Ok(counter.value)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EssayDocument {
    #[serde(rename = "_id")]
    id: EssayIdentifier,
    content: String,
    author: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<EssayDocument> for Essay {
    fn from(document: EssayDocument) -> Self {
        Self {
            id: document.id,
            content: document.content,
            author: document.author,
            created_at: document.created_at,
        }
    }
}

/// [`EssayStore`] implementation on top of a MongoDB collection
pub struct MongoEssayStore {
    essays: Collection<EssayDocument>,
    counters: Collection<CounterDocument>,
}

impl MongoEssayStore {
    /// Creates a new instance on top of the given database
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            essays: database.collection("essays"),
            counters: database.collection("counters"),
        }
    }
}

#[async_trait]
impl EssayStore for MongoEssayStore {
    async fn add(&self, request: EssayRequest) -> Result<Essay, StorageError> {
        if self
            .essays
            .find_one(doc! { "author": &request.author }, None)
            .await?
            .is_some()
        {
            return Err(StorageError::Duplicate(request.author));
        }

        let document = EssayDocument {
            id: next_identifier(&self.counters, ESSAY_COUNTER).await?,
            content: request.content,
            author: request.author,
            created_at: Utc::now(),
        };

        self.essays.insert_one(&document, None).await?;

        Ok(document.into())
    }

    async fn list(&self) -> Result<Vec<Essay>, StorageError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let documents: Vec<EssayDocument> =
            self.essays.find(doc! {}, options).await?.try_collect().await?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn get_by_author(&self, author: &str) -> Result<Essay, StorageError> {
        self.essays
            .find_one(doc! { "author": author }, None)
            .await?
            .map(Into::into)
            .ok_or(StorageError::NotFound)
    }

    async fn search_by_content(&self, term: &str) -> Result<Vec<Essay>, StorageError> {
        // Similarity ranking is the text index's job, we only forward the term
        let filter = doc! { "$text": { "$search": term } };
        let options = FindOptions::builder()
            .sort(doc! { "score": { "$meta": "textScore" } })
            .build();

        let documents: Vec<EssayDocument> =
            self.essays.find(filter, options).await?.try_collect().await?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn remove_by_author(&self, author: &str) -> Result<Essay, StorageError> {
        self.essays
            .find_one_and_delete(doc! { "author": author }, None)
            .await?
            .map(Into::into)
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewDocument {
    #[serde(rename = "_id")]
    id: ReviewIdentifier,
    essay_id: EssayIdentifier,
    rank: i32,
    content: String,
    author: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<ReviewDocument> for Review {
    fn from(document: ReviewDocument) -> Self {
        Self {
            id: document.id,
            essay_id: document.essay_id,
            rank: document.rank,
            content: document.content,
            author: document.author,
            created_at: document.created_at,
        }
    }
}

/// [`ReviewStore`] implementation on top of a MongoDB collection
pub struct MongoReviewStore {
    reviews: Collection<ReviewDocument>,
    counters: Collection<CounterDocument>,
}

impl MongoReviewStore {
    /// Creates a new instance on top of the given database
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            reviews: database.collection("reviews"),
            counters: database.collection("counters"),
        }
    }
}

#[async_trait]
impl ReviewStore for MongoReviewStore {
    async fn add(&self, request: ReviewRequest) -> Result<Review, StorageError> {
        let document = ReviewDocument {
            id: next_identifier(&self.counters, REVIEW_COUNTER).await?,
            essay_id: request.essay_id,
            rank: request.rank,
            content: request.content,
            author: request.author,
            created_at: Utc::now(),
        };

        self.reviews.insert_one(&document, None).await?;

        Ok(document.into())
    }

    async fn list(&self) -> Result<Vec<Review>, StorageError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let documents: Vec<ReviewDocument> =
            self.reviews.find(doc! {}, options).await?.try_collect().await?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn list_by_essay(&self, essay_id: EssayIdentifier) -> Result<Vec<Review>, StorageError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let documents: Vec<ReviewDocument> = self
            .reviews
            .find(doc! { "essayId": essay_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn remove(&self, review_id: ReviewIdentifier) -> Result<Review, StorageError> {
        self.reviews
            .find_one_and_delete(doc! { "_id": review_id }, None)
            .await?
            .map(Into::into)
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationDocument {
    #[serde(rename = "_id")]
    id: NotificationIdentifier,
    recipient: UserIdentifier,
    content: String,
    read: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<NotificationDocument> for Notification {
    fn from(document: NotificationDocument) -> Self {
        Self {
            id: document.id,
            recipient: document.recipient,
            content: document.content,
            read: document.read,
            created_at: document.created_at,
        }
    }
}

/// [`NotificationStore`] implementation on top of a MongoDB collection
pub struct MongoNotificationStore {
    notifications: Collection<NotificationDocument>,
    counters: Collection<CounterDocument>,
}

impl MongoNotificationStore {
    /// Creates a new instance on top of the given database
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            notifications: database.collection("notifications"),
            counters: database.collection("counters"),
        }
    }
}

#[async_trait]
impl NotificationStore for MongoNotificationStore {
    async fn create(&self, request: NotificationRequest) -> Result<Notification, StorageError> {
        let document = NotificationDocument {
            id: next_identifier(&self.counters, NOTIFICATION_COUNTER).await?,
            recipient: request.recipient,
            content: request.content,
            read: false,
            created_at: Utc::now(),
        };

        self.notifications.insert_one(&document, None).await?;

        Ok(document.into())
    }

    async fn list_by_recipient(
        &self,
        recipient: UserIdentifier,
    ) -> Result<Vec<Notification>, StorageError> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let documents: Vec<NotificationDocument> = self
            .notifications
            .find(doc! { "recipient": recipient }, options)
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn mark_read(
        &self,
        notification_id: NotificationIdentifier,
    ) -> Result<(), StorageError> {
        let result = self
            .notifications
            .update_one(
                doc! { "_id": notification_id },
                doc! { "$set": { "read": true } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn mark_all_read(&self, recipient: UserIdentifier) -> Result<u64, StorageError> {
        let result = self
            .notifications
            .update_many(
                doc! { "recipient": recipient, "read": false },
                doc! { "$set": { "read": true } },
                None,
            )
            .await?;

        Ok(result.matched_count)
    }
}
