use super::super::super::EmptyResult;
use super::ResponseLocation;
use async_trait::async_trait;
use serde::Serialize;

/// Structure which allows publishing of serialized data to a [`ResponseLocation`]
#[async_trait]
pub trait RawResponsePublisher {
    /// Sends an opaque payload to the given [`ResponseLocation`]
    async fn publish_raw(&self, data: &[u8], location: ResponseLocation) -> EmptyResult;
}

/// Publisher for responses to [`Requests`](super::Request)
#[async_trait]
pub trait ResponsePublisher {
    /// Publishes a response to the given [`ResponseLocation`]
    async fn publish<R: Send + Sync + Serialize>(
        &self,
        response: &R,
        location: ResponseLocation,
    ) -> EmptyResult;
}
