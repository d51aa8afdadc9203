use super::super::publisher::{EventRelayHandle, PublicationMode, PublicationTally};
use crate::domain::event::NewReviewNotification;
use crate::domain::request::{ReviewCreateRequest, ReviewCreateResponse};
use crate::domain::storage::ReviewStore;
use crate::domain::{ReviewRequest, REVIEW_RANK_MAX, REVIEW_RANK_MIN};
use crate::harness::Service;
use crate::library::communication::event::NotificationPublisher;
use crate::library::communication::request::{RequestProcessor, Responder};
use crate::library::communication::{BlackboxError, CommunicationFactory};
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum ReviewCreationError {
    #[error("rank {0} is outside of {REVIEW_RANK_MIN}..={REVIEW_RANK_MAX}")]
    RankOutOfRange(i32),

    #[error("review could not be stored")]
    StorageFailed(#[source] BoxedError),
}

/// Stores new reviews and announces each stored one on the event queue
///
/// Responds to:
/// - [`ReviewCreateRequest`]
///
/// Publishes:
/// - [`NewReviewNotification`]
///
/// The reply reflects the review write alone. Whatever happens to the envelope —
/// broker down, relay queue full — is logged and counted but never turns an already
/// committed review into a failure.
pub struct ReviewCreationService<F: CommunicationFactory> {
    store: Arc<dyn ReviewStore>,
    publisher: <F as CommunicationFactory>::NotificationPublisher,
    relay: EventRelayHandle,
    mode: PublicationMode,
    tally: Arc<PublicationTally>,
}

/// Configuration of the [`ReviewCreationService`]
pub struct ReviewCreationConfig {
    /// Store holding the reviews
    pub store: Arc<dyn ReviewStore>,
    /// Queue handle used in [`PublicationMode::Queued`]
    pub relay: EventRelayHandle,
    /// Selected publication mode
    pub mode: PublicationMode,
    /// Counters for publication outcomes
    pub tally: Arc<PublicationTally>,
}

impl<F> Service<F> for ReviewCreationService<F>
where
    F: CommunicationFactory + Send + Sync,
    F::NotificationPublisher: Send + Sync,
{
    const NAME: &'static str = "ReviewCreationService";

    type Instance = Responder<ReviewCreateRequest, ReviewCreationService<F>, F::ResponsePublisher>;
    type Config = ReviewCreationConfig;

    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance {
        let service = Self {
            store: config.store.clone(),
            publisher: factory.notification_publisher(),
            relay: config.relay.clone(),
            mode: config.mode,
            tally: config.tally.clone(),
        };

        Responder::new(service, factory.response_publisher())
    }
}

impl<F> ReviewCreationService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    async fn dispatch(&self, envelope: NewReviewNotification) {
        match self.mode {
            PublicationMode::Immediate => {
                if let Err(e) = self.publisher.publish(&envelope).await {
                    warn!("Failed to publish review event envelope: {}", e);
                    self.tally.record_failed();
                } else {
                    self.tally.record_delivered();
                }
            }
            PublicationMode::Queued => self.relay.enqueue(envelope),
        }
    }
}

#[async_trait]
impl<F> RequestProcessor for ReviewCreationService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    type Request = ReviewCreateRequest;

    async fn process(&self, request: Self::Request) -> Result<ReviewCreateResponse, BoxedError> {
        if !(REVIEW_RANK_MIN..=REVIEW_RANK_MAX).contains(&request.rank) {
            return Ok(ReviewCreateResponse {
                outcome: Err(BlackboxError::new(ReviewCreationError::RankOutOfRange(
                    request.rank,
                ))),
            });
        }

        let review = match self
            .store
            .add(ReviewRequest {
                essay_id: request.essay_id,
                rank: request.rank,
                content: request.content,
                author: request.author,
            })
            .await
        {
            Ok(review) => review,
            Err(e) => {
                return Ok(ReviewCreateResponse {
                    outcome: Err(BlackboxError::new(ReviewCreationError::StorageFailed(
                        e.into(),
                    ))),
                })
            }
        };

        info!(review_id = review.id, essay_id = review.essay_id, "Stored review");

        // The review is committed, delivery of the announcement is best-effort
        self.dispatch(NewReviewNotification::new(&review)).await;

        Ok(ReviewCreateResponse {
            outcome: Ok(review),
        })
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryReviewStore;
    use crate::domain::Review;
    use crate::library::communication::implementation::mock::{
        MockCommunicationFactory, MockQueueProvider, MockRequestor, MockResponseCollector,
        MockResponsePublisher,
    };
    use crate::library::EmptyResult;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use thiserror::Error;
    use tokio::sync::mpsc::error::TryRecvError;

    fn config(store: Arc<InMemoryReviewStore>, mode: PublicationMode) -> ReviewCreationConfig {
        let (relay, _job) = super::super::super::publisher::event_relay(4, "redis://unused/".into());

        ReviewCreationConfig {
            store,
            relay,
            mode,
            tally: Arc::new(PublicationTally::default()),
        }
    }

    fn expected_envelope() -> NewReviewNotification {
        NewReviewNotification::new(&Review {
            id: 1,
            essay_id: 1,
            rank: 2,
            content: "Sloppy conclusion".into(),
            author: "bob".into(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn store_the_review_and_publish_the_envelope() {
        let store = Arc::new(InMemoryReviewStore::default());
        let factory = MockCommunicationFactory::default();
        factory.expect(&expected_envelope());

        let service = ReviewCreationService::<MockCommunicationFactory> {
            store: store.clone(),
            publisher: factory.notification_publisher(),
            relay: config(store.clone(), PublicationMode::Immediate).relay,
            mode: PublicationMode::Immediate,
            tally: Arc::new(PublicationTally::default()),
        };

        let request = ReviewCreateRequest::new(1, 2, "Sloppy conclusion".into(), "bob".into());
        let response = service.process(request).await.unwrap();

        let review = response.outcome.unwrap();
        assert_eq!(review.id, 1);
        assert_eq!(review.author, "bob");
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(service.tally.delivered(), 1);
    }

    #[tokio::test]
    async fn enqueue_the_envelope_in_queued_mode() {
        let store = Arc::new(InMemoryReviewStore::default());
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let tally = Arc::new(PublicationTally::default());
        let relay = EventRelayHandle::test_handle(tx, tally.clone());

        let factory = MockCommunicationFactory::default();
        let service = ReviewCreationService::<MockCommunicationFactory> {
            store,
            publisher: factory.notification_publisher(),
            relay,
            mode: PublicationMode::Queued,
            tally,
        };

        let request = ReviewCreateRequest::new(1, 2, "Sloppy conclusion".into(), "bob".into());
        let response = service.process(request).await.unwrap();

        assert!(response.outcome.is_ok());
        assert_eq!(rx.try_recv().unwrap(), expected_envelope());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[derive(Debug, Error)]
    #[error("broker is on fire")]
    struct BrokerOnFire;

    struct FailingPublisher;

    #[async_trait]
    impl NotificationPublisher for FailingPublisher {
        async fn publish<N>(&self, _notification: &N) -> EmptyResult
        where
            N: crate::library::communication::event::Notification + Send + Sync,
        {
            Err(BrokerOnFire.into())
        }
    }

    /// Factory whose notification publisher always fails
    struct BrokenBrokerFactory;

    impl CommunicationFactory for BrokenBrokerFactory {
        type QueueProvider = MockQueueProvider;
        type NotificationPublisher = FailingPublisher;
        type Requestor = Arc<MockRequestor>;
        type ResponseCollector = MockResponseCollector;
        type ResponsePublisher = Arc<MockResponsePublisher>;

        fn queue_provider(&self) -> Self::QueueProvider {
            MockQueueProvider::default()
        }

        fn notification_publisher(&self) -> Self::NotificationPublisher {
            FailingPublisher
        }

        fn requestor(&self) -> Self::Requestor {
            Arc::new(MockRequestor::default())
        }

        fn response_collector(&self) -> Self::ResponseCollector {
            MockResponseCollector::default()
        }

        fn response_publisher(&self) -> Self::ResponsePublisher {
            Arc::new(MockResponsePublisher::default())
        }
    }

    #[tokio::test]
    async fn succeed_even_when_the_broker_is_down() {
        let store = Arc::new(InMemoryReviewStore::default());
        let config = config(store.clone(), PublicationMode::Immediate);

        let service = ReviewCreationService::<BrokenBrokerFactory> {
            store: store.clone(),
            publisher: FailingPublisher,
            relay: config.relay,
            mode: PublicationMode::Immediate,
            tally: config.tally.clone(),
        };

        let request = ReviewCreateRequest::new(1, 2, "Sloppy conclusion".into(), "bob".into());
        let response = service.process(request).await.unwrap();

        // The review write is what decides the outcome, the degraded broker
        // only shows up in the failure counter
        assert!(response.outcome.is_ok());
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(config.tally.failed(), 1);
    }

    #[tokio::test]
    async fn reject_out_of_range_ranks() {
        let store = Arc::new(InMemoryReviewStore::default());
        let factory = MockCommunicationFactory::default();

        let service = ReviewCreationService::<MockCommunicationFactory> {
            store: store.clone(),
            publisher: factory.notification_publisher(),
            relay: config(store.clone(), PublicationMode::Immediate).relay,
            mode: PublicationMode::Immediate,
            tally: Arc::new(PublicationTally::default()),
        };

        let request = ReviewCreateRequest::new(1, 9, "Sloppy conclusion".into(), "bob".into());
        let response = service.process(request).await.unwrap();

        let failure = response.outcome.unwrap_err();
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({ "causes": ["rank 9 is outside of 1..=3"] })
        );
        assert!(store.list().await.unwrap().is_empty());
    }
}
