use crate::constants::QUEUE_SIZE_REQUESTS;
use crate::domain::{EssayIdentifier, Review, ReviewIdentifier};
use crate::library::communication::event::{self, QueueDescriptor};
use crate::library::communication::request::{Request, ResponseLocation, StreamingRequest};
use crate::library::communication::BlackboxError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CREATE_QUEUE_KEY: &str = "review.create";
const LIST_QUEUE_KEY: &str = "review.list";
const BY_ESSAY_QUEUE_KEY: &str = "review.by-essay";
const REMOVE_QUEUE_KEY: &str = "review.remove";

/// Request to create a new review
///
/// Processing this request has a side effect (the review write and the resulting
/// event publication). A repeated delivery creates a second review, which the domain
/// tolerates — reviewers may submit multiple reviews of the same essay.
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct ReviewCreateRequest {
    /// Essay the review refers to
    pub essay_id: EssayIdentifier,

    /// Rank assigned by the reviewer
    pub rank: i32,

    /// Free-text body of the review
    pub content: String,

    /// Name of the reviewing user, supplied by the identity collaborator
    pub author: String,

    response_location: ResponseLocation,
}

impl ReviewCreateRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(essay_id: EssayIdentifier, rank: i32, content: String, author: String) -> Self {
        Self {
            essay_id,
            rank,
            content,
            author,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for ReviewCreateRequest {
    fn eq(&self, other: &Self) -> bool {
        self.essay_id == other.essay_id
            && self.rank == other.rank
            && self.content == other.content
            && self.author == other.author
    }
}

/// Response to a [`ReviewCreateRequest`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewCreateResponse {
    /// The stored review, or the reason why it could not be stored
    pub outcome: Result<Review, BlackboxError>,
}

impl event::Notification for ReviewCreateRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(CREATE_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for ReviewCreateRequest {
    type Response = ReviewCreateResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request for every stored review
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct ReviewListRequest {
    response_location: ResponseLocation,
}

impl ReviewListRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new() -> Self {
        Self {
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for ReviewListRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ReviewListRequest {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl event::Notification for ReviewListRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(LIST_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl StreamingRequest for ReviewListRequest {
    type Item = Review;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request for all reviews of one essay, in the order the store returns them
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct ReviewsByEssayRequest {
    /// Essay whose reviews are requested
    pub essay_id: EssayIdentifier,

    response_location: ResponseLocation,
}

impl ReviewsByEssayRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(essay_id: EssayIdentifier) -> Self {
        Self {
            essay_id,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for ReviewsByEssayRequest {
    fn eq(&self, other: &Self) -> bool {
        self.essay_id == other.essay_id
    }
}

impl event::Notification for ReviewsByEssayRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(BY_ESSAY_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl StreamingRequest for ReviewsByEssayRequest {
    type Item = Review;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request to remove a review
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct ReviewRemoveRequest {
    /// The review to remove
    pub review_id: ReviewIdentifier,

    response_location: ResponseLocation,
}

impl ReviewRemoveRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(review_id: ReviewIdentifier) -> Self {
        Self {
            review_id,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for ReviewRemoveRequest {
    fn eq(&self, other: &Self) -> bool {
        self.review_id == other.review_id
    }
}

/// Response to a [`ReviewRemoveRequest`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewRemoveResponse {
    /// The removed review, or the reason why it could not be removed
    pub outcome: Result<Review, BlackboxError>,
}

impl event::Notification for ReviewRemoveRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(REMOVE_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for ReviewRemoveRequest {
    type Response = ReviewRemoveResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}
