use crate::constants::QUEUE_SIZE_REQUESTS;
use crate::domain::{Essay, EssayWithReviews};
use crate::library::communication::event::{self, QueueDescriptor};
use crate::library::communication::request::{
    Request, ResponseLocation, StreamingRequest,
};
use crate::library::communication::BlackboxError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CREATE_QUEUE_KEY: &str = "essay.create";
const LIST_QUEUE_KEY: &str = "essay.list";
const SEARCH_QUEUE_KEY: &str = "essay.search";
const DETAIL_QUEUE_KEY: &str = "essay.detail";
const REMOVE_QUEUE_KEY: &str = "essay.remove";

/// Request to publish a new essay
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct EssayCreateRequest {
    /// Full text of the essay
    pub content: String,

    /// Name of the authoring user, supplied by the identity collaborator
    pub author: String,

    response_location: ResponseLocation,
}

impl EssayCreateRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(content: String, author: String) -> Self {
        Self {
            content,
            author,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for EssayCreateRequest {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content && self.author == other.author
    }
}

/// Response to an [`EssayCreateRequest`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EssayCreateResponse {
    /// The stored essay, or the reason why it could not be stored
    pub outcome: Result<Essay, BlackboxError>,
}

impl event::Notification for EssayCreateRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(CREATE_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for EssayCreateRequest {
    type Response = EssayCreateResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request for every published essay
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct EssayListRequest {
    response_location: ResponseLocation,
}

impl EssayListRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new() -> Self {
        Self {
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for EssayListRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for EssayListRequest {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl event::Notification for EssayListRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(LIST_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl StreamingRequest for EssayListRequest {
    type Item = Essay;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request for essays whose content resembles a search term
///
/// Ranking is delegated to the store's similarity function; the reply order
/// is the store's descending similarity order.
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct EssaySearchRequest {
    /// Search term to match essay contents against
    pub term: String,

    response_location: ResponseLocation,
}

impl EssaySearchRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(term: String) -> Self {
        Self {
            term,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for EssaySearchRequest {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl event::Notification for EssaySearchRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(SEARCH_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl StreamingRequest for EssaySearchRequest {
    type Item = Essay;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request for the detailed view of an author's essay, including all reviews
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct EssayDetailRequest {
    /// Name of the author whose essay is requested
    pub author: String,

    response_location: ResponseLocation,
}

impl EssayDetailRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(author: String) -> Self {
        Self {
            author,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for EssayDetailRequest {
    fn eq(&self, other: &Self) -> bool {
        self.author == other.author
    }
}

/// Response to an [`EssayDetailRequest`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EssayDetailResponse {
    /// The essay with its complete review collection, or the reason why the
    /// view could not be assembled
    pub outcome: Result<EssayWithReviews, BlackboxError>,
}

impl event::Notification for EssayDetailRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(DETAIL_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for EssayDetailRequest {
    type Response = EssayDetailResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}

/// Request to remove an author's essay
#[derive(Debug, Serialize, Deserialize, Eq)]
pub struct EssayRemoveRequest {
    /// Name of the author whose essay is removed
    pub author: String,

    response_location: ResponseLocation,
}

impl EssayRemoveRequest {
    /// Creates a new instance with a randomly assigned response location
    pub fn new(author: String) -> Self {
        Self {
            author,
            response_location: Uuid::new_v4().to_string(),
        }
    }
}

impl PartialEq for EssayRemoveRequest {
    fn eq(&self, other: &Self) -> bool {
        self.author == other.author
    }
}

/// Response to an [`EssayRemoveRequest`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EssayRemoveResponse {
    /// The removed essay, or the reason why it could not be removed
    pub outcome: Result<Essay, BlackboxError>,
}

impl event::Notification for EssayRemoveRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(REMOVE_QUEUE_KEY.into(), QUEUE_SIZE_REQUESTS)
    }
}

impl Request for EssayRemoveRequest {
    type Response = EssayRemoveResponse;

    fn reply_to(&self) -> ResponseLocation {
        self.response_location.clone()
    }
}
