use super::{EssayIdentifier, Review};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published essay
///
/// Each author may publish at most one essay, so lookups are keyed
/// by the author name rather than the numeric identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Essay {
    /// Unique identifier, assigned by the store
    pub id: EssayIdentifier,

    /// Full text of the essay
    pub content: String,

    /// Name of the authoring user
    pub author: String,

    /// Time at which the essay was stored
    pub created_at: DateTime<Utc>,
}

/// Data required to publish a new essay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EssayRequest {
    /// Full text of the essay
    pub content: String,

    /// Name of the authoring user
    pub author: String,
}

/// Detailed essay view combining the essay with all of its reviews
///
/// The review collection is transient — it is materialized from the review
/// component for the duration of one read request and never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EssayWithReviews {
    /// The essay itself
    pub essay: Essay,

    /// All reviews of the essay, in the order the review store returned them
    pub reviews: Vec<Review>,
}
