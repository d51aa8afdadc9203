use crate::domain::request::NotificationListRequest;
use crate::domain::storage::NotificationStore;
use crate::domain::Notification;
use crate::harness::Service;
use crate::library::communication::request::{StreamSource, StreamingResponder};
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Streams all notifications of one recipient, newest first
///
/// Responds to:
/// - [`NotificationListRequest`]
pub struct NotificationListingService {
    store: Arc<dyn NotificationStore>,
}

impl<F> Service<F> for NotificationListingService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "NotificationListingService";

    type Instance =
        StreamingResponder<NotificationListRequest, NotificationListingService, F::ResponsePublisher>;
    type Config = Arc<dyn NotificationStore>;

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
impl StreamSource for NotificationListingService {
    type Request = NotificationListRequest;

    async fn produce(&self, request: Self::Request) -> Result<Vec<Notification>, BoxedError> {
        let notifications = self.store.list_by_recipient(request.recipient).await?;
        debug!(recipient = request.recipient, count = notifications.len(), "Loaded notifications");

        Ok(notifications)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryNotificationStore;
    use crate::domain::NotificationRequest;
    use crate::library::communication::event::Consumer;
    use crate::library::communication::implementation::mock::MockCommunicationFactory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn stream_only_the_recipients_notifications() {
        let store = Arc::new(InMemoryNotificationStore::default());
        for (recipient, content) in [(1, "for alice"), (2, "for bob"), (1, "for alice again")] {
            store
                .create(NotificationRequest {
                    recipient,
                    content: content.into(),
                })
                .await
                .unwrap();
        }

        let factory = MockCommunicationFactory::default();
        let responses = factory.published_responses();
        let config: Arc<dyn NotificationStore> = store;
        let responder = NotificationListingService::instantiate(factory, &config);

        responder
            .consume(NotificationListRequest::new(1))
            .await
            .unwrap();

        let frames = responses.sent();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].0["Item"]["content"], json!("for alice again"));
        assert_eq!(frames[1].0["Item"]["content"], json!("for alice"));
        assert_eq!(frames[2].0, json!("End"));
    }

    #[tokio::test]
    async fn close_the_stream_for_unknown_recipients() {
        let store: Arc<dyn NotificationStore> = Arc::new(InMemoryNotificationStore::default());
        let factory = MockCommunicationFactory::default();
        let responses = factory.published_responses();
        let responder = NotificationListingService::instantiate(factory, &store);

        responder
            .consume(NotificationListRequest::new(9))
            .await
            .unwrap();

        let frames = responses.sent();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, json!("End"));
    }
}
