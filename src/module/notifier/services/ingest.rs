use crate::domain::event::NewReviewNotification;
use crate::domain::storage::NotificationStore;
use crate::domain::NotificationRequest;
use crate::harness::Service;
use crate::library::communication::event::Consumer;
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

/// Persists one notification row per consumed event envelope
///
/// Consumes:
/// - [`NewReviewNotification`]
///
/// The consumption loop acknowledges an entry only after [`consume`](Consumer::consume)
/// returned successfully, so the row exists before the read position advances. A crash
/// in between produces a duplicate notification on re-delivery, never a lost one.
pub struct EnvelopeIngestService {
    store: Arc<dyn NotificationStore>,
}

impl<F> Service<F> for EnvelopeIngestService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "EnvelopeIngestService";

    type Instance = EnvelopeIngestService;
    type Config = Arc<dyn NotificationStore>;

    fn instantiate(_factory: F, store: &Self::Config) -> Self::Instance {
        Self {
            store: store.clone(),
        }
    }
}

#[async_trait]
impl Consumer for EnvelopeIngestService {
    type Notification = NewReviewNotification;

    async fn consume(&self, envelope: Self::Notification) -> EmptyResult {
        debug!(kind = %envelope.kind, review_id = envelope.review_id, actor = %envelope.actor, "Consumed event envelope");

        // The recipient is taken from the envelope verbatim, routable or not
        let request = NotificationRequest {
            recipient: envelope.recipient,
            content: envelope.content,
        };

        let notification = self.store.create(request).await?;
        trace!(id = notification.id, "Inserted notification row");

        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::storage::memory::InMemoryNotificationStore;
    use crate::domain::storage::StorageError;
    use crate::domain::{Notification, Review, UserIdentifier};
    use crate::library::communication::event::{
        ConsumerExt, ConsumerGroupDescriptor, ConsumerGroupIdentifier, ConsumptionTally,
        QueueLocation,
    };
    use crate::library::communication::implementation::mock::MockQueueProvider;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn group() -> ConsumerGroupDescriptor {
        ConsumerGroupDescriptor::new(ConsumerGroupIdentifier::Notifier, QueueLocation::Head)
    }

    fn service(store: &Arc<InMemoryNotificationStore>) -> EnvelopeIngestService {
        EnvelopeIngestService {
            store: store.clone(),
        }
    }

    fn envelope() -> NewReviewNotification {
        NewReviewNotification::new(&Review {
            id: 7,
            essay_id: 1,
            rank: 2,
            content: "Sloppy conclusion".into(),
            author: "bob".into(),
            created_at: Utc::now(),
        })
    }

    async fn stored(store: &InMemoryNotificationStore, recipient: UserIdentifier) -> Vec<Notification> {
        store.list_by_recipient(recipient).await.unwrap()
    }

    #[tokio::test]
    async fn persist_one_row_per_envelope_and_advance() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let provider = MockQueueProvider::default();
        let acknowledged = provider.push(&envelope());
        let tally = ConsumptionTally::default();

        service(&store)
            .consume_queue(provider, &group(), "consumer-0", &tally)
            .await
            .unwrap();

        let notifications = stored(&store, 0).await;
        assert_eq!(notifications.len(), 1);
        assert!(!notifications[0].read);
        assert!(notifications[0].content.contains("bob"));
        assert!(acknowledged.load(Ordering::SeqCst));
        assert_eq!(tally.processed(), 1);
    }

    #[tokio::test]
    async fn abandon_malformed_envelopes() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let provider = MockQueueProvider::default();
        let acknowledged = provider.push_raw(b"certainly-not-json".to_vec());
        let tally = ConsumptionTally::default();

        service(&store)
            .consume_queue(provider, &group(), "consumer-0", &tally)
            .await
            .unwrap();

        assert!(stored(&store, 0).await.is_empty());
        assert!(!acknowledged.load(Ordering::SeqCst));
        assert_eq!(tally.decode_failures(), 1);
    }

    /// Fails the first `failures` create calls before delegating to the wrapped store
    struct FailingFirst {
        inner: Arc<InMemoryNotificationStore>,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl NotificationStore for FailingFirst {
        async fn create(
            &self,
            request: NotificationRequest,
        ) -> Result<Notification, StorageError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |f| f.checked_sub(1))
                .is_ok()
            {
                return Err(StorageError::Backend("database unavailable".into()));
            }

            self.inner.create(request).await
        }

        async fn list_by_recipient(
            &self,
            recipient: UserIdentifier,
        ) -> Result<Vec<Notification>, StorageError> {
            self.inner.list_by_recipient(recipient).await
        }

        async fn mark_read(&self, id: crate::domain::NotificationIdentifier) -> Result<(), StorageError> {
            self.inner.mark_read(id).await
        }

        async fn mark_all_read(&self, recipient: UserIdentifier) -> Result<u64, StorageError> {
            self.inner.mark_all_read(recipient).await
        }
    }

    #[tokio::test]
    async fn withhold_acknowledgement_until_the_row_exists() {
        let inner = Arc::new(InMemoryNotificationStore::default());
        let store = Arc::new(FailingFirst {
            inner: inner.clone(),
            failures: AtomicUsize::new(1),
        });
        let service = EnvelopeIngestService { store };
        let tally = ConsumptionTally::default();

        // First delivery: persistence fails, the entry stays unacknowledged
        let provider = MockQueueProvider::default();
        let first_delivery = provider.push(&envelope());

        service
            .consume_queue(provider, &group(), "consumer-0", &tally)
            .await
            .unwrap();

        assert!(!first_delivery.load(Ordering::SeqCst));
        assert!(stored(&inner, 0).await.is_empty());
        assert_eq!(tally.consume_failures(), 1);

        // Re-delivery of the same envelope: persistence succeeds, the entry is acknowledged
        let provider = MockQueueProvider::default();
        let second_delivery = provider.push(&envelope());

        service
            .consume_queue(provider, &group(), "consumer-0", &tally)
            .await
            .unwrap();

        assert!(second_delivery.load(Ordering::SeqCst));
        assert_eq!(stored(&inner, 0).await.len(), 1);
        assert_eq!(tally.processed(), 1);
    }

    #[tokio::test]
    async fn keep_the_row_when_acknowledgement_fails() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let provider = MockQueueProvider::default();
        provider.push_with_failing_ack(&envelope());
        let tally = ConsumptionTally::default();

        service(&store)
            .consume_queue(provider, &group(), "consumer-0", &tally)
            .await
            .unwrap();

        // The net effect of a failed acknowledgement is a duplicate on
        // re-delivery, never a loss
        assert_eq!(stored(&store, 0).await.len(), 1);
        assert_eq!(tally.acknowledge_failures(), 1);
    }

    #[tokio::test]
    async fn tolerate_duplicate_deliveries() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let provider = MockQueueProvider::default();
        provider.push(&envelope());
        provider.push(&envelope());
        let tally = ConsumptionTally::default();

        service(&store)
            .consume_queue(provider, &group(), "consumer-0", &tally)
            .await
            .unwrap();

        // The envelope carries no de-duplication key, a re-delivered duplicate
        // becomes a second row
        assert_eq!(stored(&store, 0).await.len(), 2);
    }
}
