use super::super::super::EmptyResult;
use super::Notification;
use super::{ConsumerGroupDescriptor, QueueEntry, QueueProvider, RawQueueEntry};
use async_trait::async_trait;
use futures::StreamExt;
use log::warn;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const BATCH_SIZE: usize = 1;
const IDLE_TIMEOUT: Option<Duration> = None;

/// Entity which may consume and process [`Notifications`](Notification)
#[async_trait]
pub trait Consumer {
    /// Notification to consume
    type Notification: Notification;

    /// Processes an event notification and returns whether it succeeded or failed
    async fn consume(&self, notification: Self::Notification) -> EmptyResult;
}

/// Counters tracking the outcomes of a consumption loop
///
/// Failures are only ever counted, never retried by the loop itself. Entries whose
/// processing failed are left unacknowledged so that the queue re-delivers them.
#[derive(Debug, Default)]
pub struct ConsumptionTally {
    processed: AtomicU64,
    decode_failures: AtomicU64,
    consume_failures: AtomicU64,
    acknowledge_failures: AtomicU64,
}

impl ConsumptionTally {
    /// Number of entries that have been processed and acknowledged
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Number of entries whose payload could not be deserialized
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::SeqCst)
    }

    /// Number of entries whose processing returned an error
    pub fn consume_failures(&self) -> u64 {
        self.consume_failures.load(Ordering::SeqCst)
    }

    /// Number of entries which were processed but could not be acknowledged
    pub fn acknowledge_failures(&self) -> u64 {
        self.acknowledge_failures.load(Ordering::SeqCst)
    }
}

/// Helper functions to aid the consumption of messages
#[async_trait]
pub trait ConsumerExt {
    /// Consumes notifications from a queue using the given provider, strictly one at a
    /// time, and acknowledges exactly those that have been successfully processed.
    ///
    /// Each entry is fully settled — processed and acknowledged, or abandoned for
    /// re-delivery — before the next one is fetched. This keeps the
    /// "persist before acknowledge" reasoning trivial at the cost of throughput.
    async fn consume_queue<Q>(
        &self,
        provider: Q,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
        tally: &ConsumptionTally,
    ) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync;
}

#[async_trait]
impl<C> ConsumerExt for C
where
    C: Consumer + Send + Sync,
    C::Notification: DeserializeOwned + Send + Sync,
{
    async fn consume_queue<Q>(
        &self,
        provider: Q,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
        tally: &ConsumptionTally,
    ) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync,
    {
        let mut stream = provider
            .consume(
                C::Notification::queue(),
                group,
                consumer,
                BATCH_SIZE,
                IDLE_TIMEOUT,
            )
            .await?;

        while let Some(item) = stream.next().await {
            match item {
                Ok(mut entry) => match entry.parse_payload::<C::Notification>() {
                    Ok(notification) => match self.consume(notification).await {
                        Ok(_) => {
                            if let Err(e) = entry.acknowledge().await {
                                // The entry has been processed, so a re-delivery duplicates
                                // its effects but never loses them.
                                tally.acknowledge_failures.fetch_add(1, Ordering::SeqCst);
                                warn!(
                                    "Failed to acknowledge {}: {}",
                                    type_name::<C::Notification>(),
                                    e
                                )
                            } else {
                                tally.processed.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                        Err(e) => {
                            tally.consume_failures.fetch_add(1, Ordering::SeqCst);
                            warn!(
                                "Failed to consume {}: {}",
                                type_name::<C::Notification>(),
                                e
                            )
                        }
                    },
                    Err(e) => {
                        tally.decode_failures.fetch_add(1, Ordering::SeqCst);
                        warn!(
                            "Failed to deserialize {}: {}",
                            type_name::<C::Notification>(),
                            e
                        )
                    }
                },
                Err(e) => warn!(
                    "Failed to receive notification {}: {}",
                    type_name::<C::Notification>(),
                    e
                ),
            }
        }

        Ok(())
    }
}
