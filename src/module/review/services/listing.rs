use crate::domain::request::{ReviewListRequest, ReviewsByEssayRequest};
use crate::domain::storage::ReviewStore;
use crate::domain::Review;
use crate::harness::Service;
use crate::library::communication::request::{StreamSource, StreamingResponder};
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Streams every stored review
///
/// Responds to:
/// - [`ReviewListRequest`]
pub struct ReviewListingService {
    store: Arc<dyn ReviewStore>,
}

impl<F> Service<F> for ReviewListingService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "ReviewListingService";

    type Instance = StreamingResponder<ReviewListRequest, ReviewListingService, F::ResponsePublisher>;
    type Config = Arc<dyn ReviewStore>;

    fn instantiate(factory: F, store: &Self::Config) -> Self::Instance {
        StreamingResponder::new(
            Self {
                store: store.clone(),
            },
            factory.response_publisher(),
        )
    }
}

#[async_trait]
impl StreamSource for ReviewListingService {
    type Request = ReviewListRequest;

    async fn produce(&self, _request: Self::Request) -> Result<Vec<Review>, BoxedError> {
        let reviews = self.store.list().await?;
        debug!(count = reviews.len(), "Loaded reviews");

        Ok(reviews)
    }
}

/// Streams all reviews of one essay, in the order the store returns them
///
/// Responds to:
/// - [`ReviewsByEssayRequest`]
///
/// This is the upstream half of the essay detail view: the essay module drains
/// this stream to completion before it composes its reply.
pub struct ReviewsByEssayService {
    store: Arc<dyn ReviewStore>,
}

impl<F> Service<F> for ReviewsByEssayService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "ReviewsByEssayService";

    type Instance =
        StreamingResponder<ReviewsByEssayRequest, ReviewsByEssayService, F::ResponsePublisher>;
    type Config = Arc<dyn ReviewStore>;

    fn instantiate(factory: F, store: &Self::Config) -> Self::Instance {
        StreamingResponder::new(
            Self {
                store: store.clone(),
            },
            factory.response_publisher(),
        )
    }
}

#[async_trait]
impl StreamSource for ReviewsByEssayService {
    type Request = ReviewsByEssayRequest;

    async fn produce(&self, request: Self::Request) -> Result<Vec<Review>, BoxedError> {
        let reviews = self.store.list_by_essay(request.essay_id).await?;
        debug!(essay_id = request.essay_id, count = reviews.len(), "Loaded reviews for essay");

        Ok(reviews)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryReviewStore;
    use crate::domain::ReviewRequest;
    use pretty_assertions::assert_eq;

    async fn seeded_store() -> Arc<InMemoryReviewStore> {
        let store = Arc::new(InMemoryReviewStore::default());

        for (essay_id, author) in [(1, "alice"), (2, "carol"), (1, "bob")] {
            store
                .add(ReviewRequest {
                    essay_id,
                    rank: 2,
                    content: "review".into(),
                    author: author.into(),
                })
                .await
                .unwrap();
        }

        store
    }

    #[tokio::test]
    async fn produce_only_the_requested_essays_reviews() {
        let service = ReviewsByEssayService {
            store: seeded_store().await,
        };

        let reviews = service
            .produce(ReviewsByEssayRequest::new(1))
            .await
            .unwrap();

        let authors: Vec<&str> = reviews.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn produce_empty_sets_for_unreviewed_essays() {
        let service = ReviewsByEssayService {
            store: seeded_store().await,
        };

        let reviews = service
            .produce(ReviewsByEssayRequest::new(9))
            .await
            .unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn produce_every_stored_review() {
        let service = ReviewListingService {
            store: seeded_store().await,
        };

        let reviews = service.produce(ReviewListRequest::new()).await.unwrap();
        assert_eq!(reviews.len(), 3);
    }
}
