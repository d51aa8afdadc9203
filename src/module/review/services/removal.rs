use crate::domain::request::{ReviewRemoveRequest, ReviewRemoveResponse};
use crate::domain::storage::{ReviewStore, StorageError};
use crate::domain::ReviewIdentifier;
use crate::harness::Service;
use crate::library::communication::request::{RequestProcessor, Responder};
use crate::library::communication::{BlackboxError, CommunicationFactory};
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum ReviewRemovalError {
    #[error("no review with id {0} exists")]
    UnknownReview(ReviewIdentifier),
}

/// Removes stored reviews
///
/// Responds to:
/// - [`ReviewRemoveRequest`]
pub struct ReviewRemovalService {
    store: Arc<dyn ReviewStore>,
}

impl<F> Service<F> for ReviewRemovalService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "ReviewRemovalService";

    type Instance = Responder<ReviewRemoveRequest, ReviewRemovalService, F::ResponsePublisher>;
    type Config = Arc<dyn ReviewStore>;

    fn instantiate(factory: F, store: &Self::Config) -> Self::Instance {
        Responder::new(
            Self {
                store: store.clone(),
            },
            factory.response_publisher(),
        )
    }
}

#[async_trait]
impl RequestProcessor for ReviewRemovalService {
    type Request = ReviewRemoveRequest;

    async fn process(&self, request: Self::Request) -> Result<ReviewRemoveResponse, BoxedError> {
        match self.store.remove(request.review_id).await {
            Ok(review) => {
                info!(review_id = review.id, "Removed review");
                Ok(ReviewRemoveResponse {
                    outcome: Ok(review),
                })
            }
            Err(StorageError::NotFound) => Ok(ReviewRemoveResponse {
                outcome: Err(BlackboxError::new(ReviewRemovalError::UnknownReview(
                    request.review_id,
                ))),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
