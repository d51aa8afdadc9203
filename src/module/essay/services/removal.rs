use crate::domain::request::{EssayRemoveRequest, EssayRemoveResponse};
use crate::domain::storage::{EssayStore, StorageError};
use crate::harness::Service;
use crate::library::communication::request::{RequestProcessor, Responder};
use crate::library::communication::{BlackboxError, CommunicationFactory};
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum EssayRemovalError {
    #[error("no essay by author {0} exists")]
    UnknownAuthor(String),
}

/// Removes published essays
///
/// Responds to:
/// - [`EssayRemoveRequest`]
pub struct EssayRemovalService {
    store: Arc<dyn EssayStore>,
}

impl<F> Service<F> for EssayRemovalService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "EssayRemovalService";

    type Instance = Responder<EssayRemoveRequest, EssayRemovalService, F::ResponsePublisher>;
    type Config = Arc<dyn EssayStore>;

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
impl RequestProcessor for EssayRemovalService {
    type Request = EssayRemoveRequest;

    async fn process(&self, request: Self::Request) -> Result<EssayRemoveResponse, BoxedError> {
        match self.store.remove_by_author(&request.author).await {
            Ok(essay) => {
                info!(essay_id = essay.id, author = %essay.author, "Removed essay");
                Ok(EssayRemoveResponse {
                    outcome: Ok(essay),
                })
            }
            Err(StorageError::NotFound) => Ok(EssayRemoveResponse {
                outcome: Err(BlackboxError::new(EssayRemovalError::UnknownAuthor(
                    request.author,
                ))),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
