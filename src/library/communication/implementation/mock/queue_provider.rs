use crate::library::communication::event::{
    ConsumerGroupDescriptor, QueueDescriptor, QueueProvider, RawQueueEntry,
};
use crate::library::communication::implementation::json::JsonQueueEntry;
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("scripted acknowledgement failure")]
struct ScriptedAckFailure;

/// Queue entry whose acknowledgement is observable (and optionally scripted to fail)
pub struct MockQueueEntry {
    payload: Vec<u8>,
    acknowledged: Arc<AtomicBool>,
    ack_fails: bool,
}

#[async_trait]
impl RawQueueEntry for MockQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        if self.ack_fails {
            return Err(ScriptedAckFailure.into());
        }

        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl JsonQueueEntry for MockQueueEntry {}

/// Scripted [`QueueProvider`] replaying a fixed sequence of entries
///
/// Entries are handed out in the order they were pushed. Each push returns a handle
/// to the entry's acknowledgement flag so tests can assert whether the read position
/// advanced past it.
#[derive(Default)]
pub struct MockQueueProvider {
    entries: Mutex<Vec<MockQueueEntry>>,
}

impl MockQueueProvider {
    /// Scripts a JSON-serialized entry, returning its acknowledgement flag
    pub fn push<N: Serialize>(&self, notification: &N) -> Arc<AtomicBool> {
        self.push_raw(serde_json::to_vec(notification).unwrap())
    }

    /// Scripts a raw payload entry, returning its acknowledgement flag
    pub fn push_raw(&self, payload: Vec<u8>) -> Arc<AtomicBool> {
        let acknowledged = Arc::new(AtomicBool::new(false));

        self.entries.lock().unwrap().push(MockQueueEntry {
            payload,
            acknowledged: acknowledged.clone(),
            ack_fails: false,
        });

        acknowledged
    }

    /// Scripts an entry whose acknowledgement fails, returning its (never set) flag
    pub fn push_with_failing_ack<N: Serialize>(&self, notification: &N) -> Arc<AtomicBool> {
        let acknowledged = Arc::new(AtomicBool::new(false));

        self.entries.lock().unwrap().push(MockQueueEntry {
            payload: serde_json::to_vec(notification).unwrap(),
            acknowledged: acknowledged.clone(),
            ack_fails: true,
        });

        acknowledged
    }
}

#[async_trait]
impl QueueProvider for MockQueueProvider {
    type Entry = MockQueueEntry;

    async fn consume(
        &self,
        _queue: QueueDescriptor,
        _group: &ConsumerGroupDescriptor,
        _consumer: &str,
        _batch_size: usize,
        _idle_timeout: Option<Duration>,
    ) -> Result<BoxStream<Result<Self::Entry, BoxedError>>, BoxedError> {
        let entries = std::mem::take(&mut *self.entries.lock().unwrap());
        Ok(stream::iter(entries).map(Ok).boxed())
    }
}
