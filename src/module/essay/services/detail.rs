use crate::domain::request::{EssayDetailRequest, EssayDetailResponse, ReviewsByEssayRequest};
use crate::domain::storage::{EssayStore, StorageError};
use crate::domain::EssayWithReviews;
use crate::harness::Service;
use crate::library::communication::request::{
    RequestError, RequestProcessor, Responder, ResponseCollectionTimeout, StreamAggregator,
};
use crate::library::communication::{BlackboxError, CommunicationFactory};
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REVIEW_STREAM_TIMEOUT: ResponseCollectionTimeout =
    ResponseCollectionTimeout::TotalDuration(Duration::from_secs(10));

#[derive(Debug, Error)]
enum EssayDetailError {
    #[error("no essay by author {0} exists")]
    UnknownAuthor(String),

    #[error("essay could not be loaded")]
    StorageFailed(#[source] BoxedError),
}

/// Assembles the detailed essay view by draining the review stream
///
/// Responds to:
/// - [`EssayDetailRequest`]
///
/// Requests:
/// - [`ReviewsByEssayRequest`]
///
/// The review collection is materialized in full before the reply is composed. A
/// faulted or interrupted stream fails the whole request — an essay is never
/// returned with an incomplete or unknown-complete review list. The read is a
/// snapshot: reviews created while the stream is draining may or may not appear.
pub struct EssayDetailService<F: CommunicationFactory> {
    store: Arc<dyn EssayStore>,
    requestor: <F as CommunicationFactory>::Requestor,
}

impl<F> Service<F> for EssayDetailService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "EssayDetailService";

    type Instance = Responder<EssayDetailRequest, EssayDetailService<F>, F::ResponsePublisher>;
    type Config = Arc<dyn EssayStore>;

    fn instantiate(factory: F, store: &Self::Config) -> Self::Instance {
        let service = Self {
            store: store.clone(),
            requestor: factory.requestor(),
        };

        Responder::new(service, factory.response_publisher())
    }
}

impl<F> EssayDetailService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    async fn assemble(&self, author: &str) -> Result<EssayWithReviews, EssayDetailError> {
        let essay = match self.store.get_by_author(author).await {
            Ok(essay) => essay,
            Err(StorageError::NotFound) => {
                return Err(EssayDetailError::UnknownAuthor(author.to_owned()))
            }
            Err(e) => return Err(EssayDetailError::StorageFailed(e.into())),
        };

        let reviews = self
            .requestor
            .request_stream(&ReviewsByEssayRequest::new(essay.id), REVIEW_STREAM_TIMEOUT)
            .await
            .map_err(RequestFailure)?;

        debug!(essay_id = essay.id, reviews = reviews.len(), "Assembled essay with reviews");

        Ok(EssayWithReviews { essay, reviews })
    }
}

/// Wrapper keeping the transport failure distinguishable from business failures
#[derive(Debug, Error)]
#[error("review stream failed")]
struct RequestFailure(#[source] RequestError);

impl From<RequestFailure> for EssayDetailError {
    fn from(failure: RequestFailure) -> Self {
        Self::StorageFailed(failure.into())
    }
}

#[async_trait]
impl<F> RequestProcessor for EssayDetailService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    type Request = EssayDetailRequest;

    async fn process(&self, request: Self::Request) -> Result<EssayDetailResponse, BoxedError> {
        match self.assemble(&request.author).await {
            Ok(view) => Ok(EssayDetailResponse { outcome: Ok(view) }),
            Err(EssayDetailError::UnknownAuthor(author)) => Ok(EssayDetailResponse {
                outcome: Err(BlackboxError::new(EssayDetailError::UnknownAuthor(author))),
            }),
            // Transport and storage faults fail the call itself, there is no
            // partial-result fallback
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryEssayStore;
    use crate::domain::{EssayRequest, Review};
    use crate::library::communication::implementation::mock::MockCommunicationFactory;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    async fn store_with_essay() -> (Arc<InMemoryEssayStore>, crate::domain::Essay) {
        let store = Arc::new(InMemoryEssayStore::default());
        let essay = store
            .add(EssayRequest {
                content: "On the nature of things".into(),
                author: "alice".into(),
            })
            .await
            .unwrap();

        (store, essay)
    }

    fn review(id: i64, author: &str) -> Review {
        Review {
            id,
            essay_id: 1,
            rank: 2,
            content: format!("review by {}", author),
            author: author.into(),
            created_at: Utc::now(),
        }
    }

    fn service(
        store: Arc<InMemoryEssayStore>,
        factory: &MockCommunicationFactory,
    ) -> EssayDetailService<MockCommunicationFactory> {
        EssayDetailService {
            store,
            requestor: factory.requestor(),
        }
    }

    #[tokio::test]
    async fn assemble_the_essay_with_its_streamed_reviews() {
        let (store, essay) = store_with_essay().await;
        let reviews = vec![review(1, "bob"), review(2, "carol")];

        let factory = MockCommunicationFactory::default();
        factory.expect_and_stream(&ReviewsByEssayRequest::new(essay.id), reviews.clone());

        let response = service(store, &factory)
            .process(EssayDetailRequest::new("alice".into()))
            .await
            .unwrap();

        assert_eq!(
            response.outcome.unwrap(),
            EssayWithReviews { essay, reviews }
        );
    }

    #[tokio::test]
    async fn assemble_the_view_from_reviews_held_by_the_review_store() {
        use crate::domain::storage::memory::InMemoryReviewStore;
        use crate::domain::storage::ReviewStore;
        use crate::domain::ReviewRequest;

        let (store, essay) = store_with_essay().await;

        // Two reviews against the essay, stored the way the review module stores them
        let review_store = InMemoryReviewStore::default();
        for author in ["bob", "carol"] {
            review_store
                .add(ReviewRequest {
                    essay_id: essay.id,
                    rank: 2,
                    content: format!("review by {}", author),
                    author: author.into(),
                })
                .await
                .unwrap();
        }
        let reviews = review_store.list_by_essay(essay.id).await.unwrap();

        let factory = MockCommunicationFactory::default();
        factory.expect_and_stream(&ReviewsByEssayRequest::new(essay.id), reviews.clone());

        let response = service(store, &factory)
            .process(EssayDetailRequest::new("alice".into()))
            .await
            .unwrap();

        let view = response.outcome.unwrap();
        assert_eq!(view.reviews.len(), 2);
        assert_eq!(view.reviews, reviews);
    }

    #[tokio::test]
    async fn return_identical_views_for_consecutive_quiescent_reads() {
        let (store, essay) = store_with_essay().await;
        let reviews = vec![review(1, "bob"), review(2, "carol")];

        let factory = MockCommunicationFactory::default();
        factory
            .expect_and_stream(&ReviewsByEssayRequest::new(essay.id), reviews.clone())
            .expect_and_stream(&ReviewsByEssayRequest::new(essay.id), reviews);

        let service = service(store, &factory);
        let first = service
            .process(EssayDetailRequest::new("alice".into()))
            .await
            .unwrap();
        let second = service
            .process(EssayDetailRequest::new("alice".into()))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn assemble_unreviewed_essays_with_an_empty_collection() {
        let (store, essay) = store_with_essay().await;

        let factory = MockCommunicationFactory::default();
        factory.expect_and_stream(&ReviewsByEssayRequest::new(essay.id), Vec::new());

        let response = service(store, &factory)
            .process(EssayDetailRequest::new("alice".into()))
            .await
            .unwrap();

        assert_eq!(response.outcome.unwrap().reviews, Vec::new());
    }

    #[tokio::test]
    async fn fail_the_request_when_the_review_stream_breaks() {
        let (store, essay) = store_with_essay().await;

        let factory = MockCommunicationFactory::default();
        factory.expect_and_interrupt(
            &ReviewsByEssayRequest::new(essay.id),
            vec![review(1, "bob")],
        );

        let result = service(store, &factory)
            .process(EssayDetailRequest::new("alice".into()))
            .await;

        // No partial review list ever leaves this service
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn report_unknown_authors_in_band() {
        let store = Arc::new(InMemoryEssayStore::default());
        let factory = MockCommunicationFactory::default();

        let response = service(store, &factory)
            .process(EssayDetailRequest::new("nobody".into()))
            .await
            .unwrap();

        assert!(response.outcome.is_err());
    }
}
