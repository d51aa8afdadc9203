use crate::domain::request::{EssayListRequest, EssaySearchRequest};
use crate::domain::storage::EssayStore;
use crate::domain::Essay;
use crate::harness::Service;
use crate::library::communication::request::{StreamSource, StreamingResponder};
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Streams every published essay
///
/// Responds to:
/// - [`EssayListRequest`]
pub struct EssayListingService {
    store: Arc<dyn EssayStore>,
}

impl<F> Service<F> for EssayListingService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "EssayListingService";

    type Instance = StreamingResponder<EssayListRequest, EssayListingService, F::ResponsePublisher>;
    type Config = Arc<dyn EssayStore>;

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
impl StreamSource for EssayListingService {
    type Request = EssayListRequest;

    async fn produce(&self, _request: Self::Request) -> Result<Vec<Essay>, BoxedError> {
        let essays = self.store.list().await?;
        debug!(count = essays.len(), "Loaded essays");

        Ok(essays)
    }
}

/// Streams essays matching a content search, most similar first
///
/// Responds to:
/// - [`EssaySearchRequest`]
///
/// Similarity ranking is delegated entirely to the store.
pub struct EssaySearchService {
    store: Arc<dyn EssayStore>,
}

impl<F> Service<F> for EssaySearchService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "EssaySearchService";

    type Instance = StreamingResponder<EssaySearchRequest, EssaySearchService, F::ResponsePublisher>;
    type Config = Arc<dyn EssayStore>;

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
impl StreamSource for EssaySearchService {
    type Request = EssaySearchRequest;

    async fn produce(&self, request: Self::Request) -> Result<Vec<Essay>, BoxedError> {
        let essays = self.store.search_by_content(&request.term).await?;
        debug!(term = %request.term, count = essays.len(), "Searched essays");

        Ok(essays)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryEssayStore;
    use crate::domain::EssayRequest;
    use pretty_assertions::assert_eq;

    async fn seeded_store() -> Arc<InMemoryEssayStore> {
        let store = Arc::new(InMemoryEssayStore::default());

        for (author, content) in [
            ("alice", "Essays about essays"),
            ("bob", "A pamphlet on style"),
        ] {
            store
                .add(EssayRequest {
                    content: content.into(),
                    author: author.into(),
                })
                .await
                .unwrap();
        }

        store
    }

    #[tokio::test]
    async fn produce_every_essay_in_insertion_order() {
        let service = EssayListingService {
            store: seeded_store().await,
        };

        let essays = service.produce(EssayListRequest::new()).await.unwrap();
        let authors: Vec<&str> = essays.iter().map(|e| e.author.as_str()).collect();

        assert_eq!(authors, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn produce_only_matching_essays_for_searches() {
        let service = EssaySearchService {
            store: seeded_store().await,
        };

        let essays = service
            .produce(EssaySearchRequest::new("pamphlet".into()))
            .await
            .unwrap();

        assert_eq!(essays.len(), 1);
        assert_eq!(essays[0].author, "bob");
    }
}
