use crate::domain::request::{
    MarkAllReadRequest, MarkAllReadResponse, MarkReadRequest, MarkReadResponse,
};
use crate::domain::storage::{NotificationStore, StorageError};
use crate::harness::Service;
use crate::library::communication::request::{RequestProcessor, Responder};
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Marks a single notification as read
///
/// Responds to:
/// - [`MarkReadRequest`]
///
/// Marking is idempotent — a notification that is already read marks again without
/// complaint. Only an unknown identifier yields `success = false`; backend failures
/// propagate as processing errors instead of masquerading as business outcomes.
pub struct MarkReadService {
    store: Arc<dyn NotificationStore>,
}

impl<F> Service<F> for MarkReadService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "MarkReadService";

    type Instance = Responder<MarkReadRequest, MarkReadService, F::ResponsePublisher>;
    type Config = Arc<dyn NotificationStore>;

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
impl RequestProcessor for MarkReadService {
    type Request = MarkReadRequest;

    async fn process(&self, request: Self::Request) -> Result<MarkReadResponse, BoxedError> {
        match self.store.mark_read(request.notification_id).await {
            Ok(()) => Ok(MarkReadResponse { success: true }),
            Err(StorageError::NotFound) => {
                warn!(
                    notification_id = request.notification_id,
                    "Notification not found for marking as read"
                );
                Ok(MarkReadResponse { success: false })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Marks every notification of a recipient as read
///
/// Responds to:
/// - [`MarkAllReadRequest`]
///
/// A recipient without unread notifications is a successful no-op; the response
/// carries the matched-row count so callers can tell the two apart.
pub struct MarkAllReadService {
    store: Arc<dyn NotificationStore>,
}

impl<F> Service<F> for MarkAllReadService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "MarkAllReadService";

    type Instance = Responder<MarkAllReadRequest, MarkAllReadService, F::ResponsePublisher>;
    type Config = Arc<dyn NotificationStore>;

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
impl RequestProcessor for MarkAllReadService {
    type Request = MarkAllReadRequest;

    async fn process(&self, request: Self::Request) -> Result<MarkAllReadResponse, BoxedError> {
        let updated = self.store.mark_all_read(request.recipient).await?;
        debug!(recipient = request.recipient, updated, "Marked notifications as read");

        Ok(MarkAllReadResponse {
            success: true,
            updated,
        })
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryNotificationStore;
    use crate::domain::NotificationRequest;
    use pretty_assertions::assert_eq;

    async fn store_with_notification() -> (Arc<InMemoryNotificationStore>, i64) {
        let store = Arc::new(InMemoryNotificationStore::default());
        let notification = store
            .create(NotificationRequest {
                recipient: 1,
                content: "unread".into(),
            })
            .await
            .unwrap();

        (store, notification.id)
    }

    #[tokio::test]
    async fn mark_notifications_as_read() {
        let (store, id) = store_with_notification().await;
        let service = MarkReadService {
            store: store.clone(),
        };

        let response = service.process(MarkReadRequest::new(id)).await.unwrap();

        assert_eq!(response, MarkReadResponse { success: true });
        assert!(store.list_by_recipient(1).await.unwrap()[0].read);
    }

    #[tokio::test]
    async fn mark_idempotently() {
        let (store, id) = store_with_notification().await;
        let service = MarkReadService { store };

        let first = service.process(MarkReadRequest::new(id)).await.unwrap();
        let second = service.process(MarkReadRequest::new(id)).await.unwrap();

        // Marking an already-read notification behaves exactly like the first call
        assert_eq!(first, second);
        assert!(second.success);
    }

    #[tokio::test]
    async fn report_unknown_notifications() {
        let store: Arc<dyn NotificationStore> = Arc::new(InMemoryNotificationStore::default());
        let service = MarkReadService { store };

        let response = service.process(MarkReadRequest::new(42)).await.unwrap();

        assert_eq!(response, MarkReadResponse { success: false });
    }

    #[tokio::test]
    async fn count_marked_notifications() {
        let store = Arc::new(InMemoryNotificationStore::default());
        for content in ["one", "two", "three"] {
            store
                .create(NotificationRequest {
                    recipient: 1,
                    content: content.into(),
                })
                .await
                .unwrap();
        }

        let service = MarkAllReadService { store };

        let response = service.process(MarkAllReadRequest::new(1)).await.unwrap();
        assert_eq!(response.success, true);
        assert_eq!(response.updated, 3);

        // No unread notifications left: still a success, but nothing matched
        let rerun = service.process(MarkAllReadRequest::new(1)).await.unwrap();
        assert_eq!(rerun.success, true);
        assert_eq!(rerun.updated, 0);
    }
}
