use crate::constants::{EVENT_KIND_NEW_REVIEW, QUEUE_SIZE_EVENTS};
use crate::domain::{EssayIdentifier, Review, ReviewIdentifier, UserIdentifier};
use crate::library::communication::event::{self, QueueDescriptor};
use serde::{Deserialize, Serialize};

const QUEUE_KEY: &str = "notifications";
const QUEUE_SIZE: usize = QUEUE_SIZE_EVENTS;

/// A review has been durably stored
///
/// Published by the review component after the review write committed, consumed by the
/// notifier component which turns it into a persisted [`Notification`](crate::domain::Notification)
/// for the essay's author.
///
/// The envelope is immutable once serialized and carries no schema version, so every
/// field is decoded permissively: absent fields fall back to their default value and
/// unknown fields are ignored.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewReviewNotification {
    /// Tag describing what happened, [`EVENT_KIND_NEW_REVIEW`] for this envelope
    #[serde(default)]
    pub kind: String,

    /// User the resulting notification should be routed to
    ///
    /// Currently always zero — the publisher does not resolve the essay author's id
    /// and the consumer propagates the value unchanged.
    // TODO Resolve the essay author's id at publish time once the essay store is reachable from the review module
    #[serde(default)]
    pub recipient: UserIdentifier,

    /// Human readable message for the resulting notification
    #[serde(default)]
    pub content: String,

    /// Essay the review refers to
    #[serde(default)]
    pub essay_id: EssayIdentifier,

    /// The stored review
    #[serde(default)]
    pub review_id: ReviewIdentifier,

    /// Name of the reviewing user
    #[serde(default)]
    pub actor: String,
}

impl NewReviewNotification {
    /// Creates the envelope announcing a freshly stored review
    pub fn new(review: &Review) -> Self {
        Self {
            kind: EVENT_KIND_NEW_REVIEW.to_string(),
            recipient: 0,
            content: format!("Your essay has been reviewed by {}", review.author),
            essay_id: review.essay_id,
            review_id: review.id,
            actor: review.author.clone(),
        }
    }
}

impl event::Notification for NewReviewNotification {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(QUEUE_KEY.into(), QUEUE_SIZE)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn describe_the_stored_review() {
        let review = Review {
            id: 7,
            essay_id: 1,
            rank: 2,
            content: "Needs more citations".into(),
            author: "bob".into(),
            created_at: Utc::now(),
        };

        let envelope = NewReviewNotification::new(&review);

        assert_eq!(envelope.kind, "new_review");
        assert_eq!(envelope.recipient, 0);
        assert_eq!(envelope.content, "Your essay has been reviewed by bob");
        assert_eq!(envelope.essay_id, 1);
        assert_eq!(envelope.review_id, 7);
        assert_eq!(envelope.actor, "bob");
    }

    #[test]
    fn decode_sparse_envelopes() {
        let envelope: NewReviewNotification =
            serde_json::from_str(r#"{"recipient":3,"content":"hi"}"#).unwrap();

        assert_eq!(envelope.recipient, 3);
        assert_eq!(envelope.content, "hi");
        assert_eq!(envelope.kind, "");
        assert_eq!(envelope.essay_id, 0);
        assert_eq!(envelope.review_id, 0);
        assert_eq!(envelope.actor, "");
    }

    #[test]
    fn tolerate_unknown_fields() {
        let envelope: NewReviewNotification = serde_json::from_str(
            r#"{"kind":"new_review","recipient":1,"content":"hi","schema_revision":9}"#,
        )
        .unwrap();

        assert_eq!(envelope.kind, "new_review");
        assert_eq!(envelope.recipient, 1);
    }
}
