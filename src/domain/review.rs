use super::{EssayIdentifier, ReviewIdentifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest rank a review may assign
pub const REVIEW_RANK_MIN: i32 = 1;

/// Highest rank a review may assign
pub const REVIEW_RANK_MAX: i32 = 3;

/// A peer review of an essay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    /// Unique identifier, assigned by the store
    pub id: ReviewIdentifier,

    /// Essay the review refers to
    pub essay_id: EssayIdentifier,

    /// Rank assigned by the reviewer, within `REVIEW_RANK_MIN..=REVIEW_RANK_MAX`
    pub rank: i32,

    /// Free-text body of the review
    pub content: String,

    /// Name of the reviewing user
    pub author: String,

    /// Time at which the review was stored
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Essay the review refers to
    pub essay_id: EssayIdentifier,

    /// Rank assigned by the reviewer
    pub rank: i32,

    /// Free-text body of the review
    pub content: String,

    /// Name of the reviewing user
    pub author: String,
}
