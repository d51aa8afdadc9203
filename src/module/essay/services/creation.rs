use crate::domain::request::{EssayCreateRequest, EssayCreateResponse};
use crate::domain::storage::{EssayStore, StorageError};
use crate::domain::EssayRequest;
use crate::harness::Service;
use crate::library::communication::request::{RequestProcessor, Responder};
use crate::library::communication::{BlackboxError, CommunicationFactory};
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum EssayCreationError {
    #[error("author {0} has already published an essay")]
    AuthorAlreadyPublished(String),
}

/// Stores new essays
///
/// Responds to:
/// - [`EssayCreateRequest`]
pub struct EssayCreationService {
    store: Arc<dyn EssayStore>,
}

impl<F> Service<F> for EssayCreationService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "EssayCreationService";

    type Instance = Responder<EssayCreateRequest, EssayCreationService, F::ResponsePublisher>;
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
impl RequestProcessor for EssayCreationService {
    type Request = EssayCreateRequest;

    async fn process(&self, request: Self::Request) -> Result<EssayCreateResponse, BoxedError> {
        match self
            .store
            .add(EssayRequest {
                content: request.content,
                author: request.author,
            })
            .await
        {
            Ok(essay) => {
                info!(essay_id = essay.id, author = %essay.author, "Stored essay");
                Ok(EssayCreateResponse { outcome: Ok(essay) })
            }
            Err(StorageError::Duplicate(author)) => Ok(EssayCreateResponse {
                outcome: Err(BlackboxError::new(EssayCreationError::AuthorAlreadyPublished(
                    author,
                ))),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryEssayStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn store_new_essays() {
        let store = Arc::new(InMemoryEssayStore::default());
        let service = EssayCreationService {
            store: store.clone(),
        };

        let response = service
            .process(EssayCreateRequest::new("Content".into(), "alice".into()))
            .await
            .unwrap();

        let essay = response.outcome.unwrap();
        assert_eq!(essay.author, "alice");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reject_a_second_essay_per_author() {
        let store = Arc::new(InMemoryEssayStore::default());
        let service = EssayCreationService { store };

        service
            .process(EssayCreateRequest::new("First".into(), "alice".into()))
            .await
            .unwrap()
            .outcome
            .unwrap();

        let response = service
            .process(EssayCreateRequest::new("Second".into(), "alice".into()))
            .await
            .unwrap();

        assert!(response.outcome.is_err());
    }
}
