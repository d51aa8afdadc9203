use crate::library::communication::request::{ResponseLocation, ResponsePublisher};
use crate::library::EmptyResult;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Recording [`ResponsePublisher`] capturing every published response
#[derive(Default)]
pub struct MockResponsePublisher {
    sent: Mutex<Vec<(Value, ResponseLocation)>>,
}

impl MockResponsePublisher {
    /// Returns every response published so far, with its destination
    pub fn sent(&self) -> Vec<(Value, ResponseLocation)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponsePublisher for Arc<MockResponsePublisher> {
    async fn publish<R: Send + Sync + Serialize>(
        &self,
        response: &R,
        location: ResponseLocation,
    ) -> EmptyResult {
        self.sent
            .lock()
            .unwrap()
            .push((serde_json::to_value(response).unwrap(), location));

        Ok(())
    }
}
