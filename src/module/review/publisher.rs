use crate::domain::event::NewReviewNotification;
use crate::harness::RedisCommunicationFactory;
use crate::library::communication::event::NotificationPublisher;
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use anyhow::anyhow;
use async_trait::async_trait;
use jatsl::{Job, JobManager};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

/// Whether the publisher confirms broker delivery before the review-creation reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationMode {
    /// Publish before replying; deterministic for test harnesses observing delivery
    Immediate,
    /// Hand the envelope to the relay queue and reply right away; publication
    /// latency never adds to request latency
    Queued,
}

/// Counters tracking envelope publication outcomes
///
/// Publication failures are counted and logged, never surfaced to the
/// review-creation caller — the review is already committed at that point.
#[derive(Debug, Default)]
pub struct PublicationTally {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl PublicationTally {
    /// Number of envelopes confirmed by the broker
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Number of envelopes that were dropped or rejected
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sending half of the bounded relay queue
///
/// Enqueueing never blocks and never fails the caller: when the queue is full the
/// envelope is dropped, logged and counted. Callers that need back-pressure beyond
/// this are expected to use [`PublicationMode::Immediate`] instead.
#[derive(Clone)]
pub struct EventRelayHandle {
    tx: mpsc::Sender<NewReviewNotification>,
    tally: Arc<PublicationTally>,
}

#[cfg(test)]
impl EventRelayHandle {
    pub(crate) fn test_handle(
        tx: mpsc::Sender<NewReviewNotification>,
        tally: Arc<PublicationTally>,
    ) -> Self {
        Self { tx, tally }
    }
}

impl EventRelayHandle {
    /// Places an envelope on the relay queue
    pub fn enqueue(&self, envelope: NewReviewNotification) {
        if let Err(e) = self.tx.try_send(envelope) {
            warn!("Dropped review event envelope: {}", e);
            self.tally.record_failed();
        }
    }
}

/// Background worker draining the relay queue into the broker
///
/// There is exactly one relay job per review process; it owns the receiving half of
/// the queue. Envelopes that fail to publish are logged and counted but not retried.
pub struct EventRelayJob {
    receiver: Mutex<mpsc::Receiver<NewReviewNotification>>,
    redis_url: String,
    tally: Arc<PublicationTally>,
}

/// Creates the bounded relay queue, returning the enqueueing handle and the job
pub fn event_relay(capacity: usize, redis_url: String) -> (EventRelayHandle, EventRelayJob) {
    let (tx, rx) = mpsc::channel(capacity);
    let tally = Arc::new(PublicationTally::default());

    let handle = EventRelayHandle {
        tx,
        tally: tally.clone(),
    };

    let job = EventRelayJob {
        receiver: Mutex::new(rx),
        redis_url,
        tally,
    };

    (handle, job)
}

impl EventRelayJob {
    /// Counters shared with the enqueueing handle
    pub fn tally(&self) -> Arc<PublicationTally> {
        self.tally.clone()
    }

    async fn relay_envelopes<P: NotificationPublisher>(&self, publisher: P) {
        let mut receiver = self.receiver.lock().await;

        while let Some(envelope) = receiver.recv().await {
            match publisher.publish(&envelope).await {
                Ok(()) => self.tally.record_delivered(),
                Err(e) => {
                    warn!("Failed to publish review event envelope: {}", e);
                    self.tally.record_failed();
                }
            }
        }
    }
}

#[async_trait]
impl Job for EventRelayJob {
    const NAME: &'static str = module_path!();

    async fn execute(&self, manager: JobManager) -> EmptyResult {
        let handle_provider = Arc::new(manager.clone());
        let factory = RedisCommunicationFactory::new(self.redis_url.clone(), handle_provider);
        let publisher = factory.notification_publisher();

        manager.ready().await;
        self.relay_envelopes(publisher).await;

        Err(anyhow!("Unexpected termination of supposedly infinite event relay loop").into())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::Review;
    use crate::library::communication::implementation::mock::MockNotificationPublisher;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn envelope(review_id: i64) -> NewReviewNotification {
        NewReviewNotification::new(&Review {
            id: review_id,
            essay_id: 1,
            rank: 2,
            content: "content".into(),
            author: "bob".into(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn relay_enqueued_envelopes() {
        let (handle, job) = event_relay(4, "redis://unused/".into());
        let publisher = Arc::new(MockNotificationPublisher::default());

        publisher.expect(&envelope(1)).expect(&envelope(2));

        handle.enqueue(envelope(1));
        handle.enqueue(envelope(2));
        drop(handle);

        job.relay_envelopes(publisher).await;

        assert_eq!(job.tally().delivered(), 2);
        assert_eq!(job.tally().failed(), 0);
    }

    #[tokio::test]
    async fn drop_envelopes_when_the_queue_is_full() {
        let (handle, job) = event_relay(1, "redis://unused/".into());

        handle.enqueue(envelope(1));
        // The queue holds one element, so this one has nowhere to go
        handle.enqueue(envelope(2));
        drop(handle);

        let publisher = Arc::new(MockNotificationPublisher::default());
        publisher.expect(&envelope(1));
        job.relay_envelopes(publisher).await;

        assert_eq!(job.tally().delivered(), 1);
        assert_eq!(job.tally().failed(), 1);
    }
}
