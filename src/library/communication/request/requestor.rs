use super::super::super::BoxedError;
use super::super::event::NotificationPublisher;
use super::super::BlackboxError;
use super::ResponseCollectionTimeout;
use super::{Request, ResponseCollector, StreamFrame, StreamingRequest};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;

/// Error type for sending requests
#[derive(Error, Debug)]
pub enum RequestError {
    /// Publishing of the request failed
    #[error("sending of request failed")]
    SendingFailure(#[source] BoxedError),
    /// Response collector was unable to start listening for responses
    #[error("unable to collect responses")]
    ResponseCollectionFailed(#[source] BoxedError),
    /// An individual response could not be received or parsed
    #[error("response not receivable")]
    ReceptionFailed(#[source] BoxedError),
    /// The responder reported a failure instead of a result set
    #[error("remote side failed to produce the result")]
    RemoteFailure(#[source] BlackboxError),
    /// The reply channel ran dry before an end-of-stream marker arrived
    #[error("reply stream ended without an end-of-stream marker")]
    StreamInterrupted,
}

/// Handler for sending requests and collecting responses
#[async_trait]
pub trait Requestor {
    /// Sends out a request and awaits responses
    ///
    /// Note that either a `limit` or `timeout` has to be provided. If neither is given, the function would block indefinitely and will panic.
    async fn request<R>(
        &self,
        request: &R,
        limit: Option<usize>,
        timeout: ResponseCollectionTimeout,
    ) -> Result<Vec<R::Response>, RequestError>
    where
        R: Request + Send + Sync,
        R::Response: Send + Sync;
}

/// Handler for sending [`StreamingRequests`](StreamingRequest) and draining the reply stream
///
/// The reply is only ever surfaced as a whole: either every item up to the end-of-stream
/// marker was received, or the call fails. A partially received result set is never
/// returned, since the caller could not distinguish it from a complete one.
#[async_trait]
pub trait StreamAggregator {
    /// Sends out a streaming request and collects the reply frames until the stream concludes
    async fn request_stream<R>(
        &self,
        request: &R,
        timeout: ResponseCollectionTimeout,
    ) -> Result<Vec<R::Item>, RequestError>
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync;
}

/// [`Requestor`] and [`StreamAggregator`] implementation combining a
/// [`NotificationPublisher`] and [`ResponseCollector`]
pub struct CompositeRequestor<P: NotificationPublisher, C: ResponseCollector> {
    publisher: P,
    collector: C,
}

impl<P, C> CompositeRequestor<P, C>
where
    P: NotificationPublisher,
    C: ResponseCollector,
{
    /// Creates a new instance from raw parts
    pub fn new(publisher: P, collector: C) -> Self {
        Self {
            publisher,
            collector,
        }
    }
}

#[async_trait]
impl<P, C> Requestor for CompositeRequestor<P, C>
where
    P: NotificationPublisher + Send + Sync,
    C: ResponseCollector + Send + Sync,
{
    /// Sends a request by delegating to a [`NotificationPublisher`] and collects responses using a [`ResponseCollector`]
    async fn request<R>(
        &self,
        request: &R,
        limit: Option<usize>,
        timeout: ResponseCollectionTimeout,
    ) -> Result<Vec<R::Response>, RequestError>
    where
        R: Request + Send + Sync,
        R::Response: Send + Sync,
    {
        assert!(
            limit.is_some() || timeout != ResponseCollectionTimeout::None,
            "Calling `request` without a limit or timeout would block indefinitely!"
        );

        // Send the request
        self.publisher
            .publish(request)
            .await
            .map_err(RequestError::SendingFailure)?;

        // Create a stream for receiving responses
        let stream = self
            .collector
            .collect::<R::Response>(request.reply_to(), limit, timeout)
            .await
            .map_err(RequestError::ResponseCollectionFailed)?;

        // Condense the stream of responses and flatten the errors. A single erroneous
        // response poisons the whole call — the caller can not tell which responses
        // would have been missing.
        let responses = stream
            .try_collect::<Vec<_>>()
            .await
            .map_err(RequestError::ReceptionFailed)?;

        Ok(responses)
    }
}

#[async_trait]
impl<P, C> StreamAggregator for CompositeRequestor<P, C>
where
    P: NotificationPublisher + Send + Sync,
    C: ResponseCollector + Send + Sync,
{
    async fn request_stream<R>(
        &self,
        request: &R,
        timeout: ResponseCollectionTimeout,
    ) -> Result<Vec<R::Item>, RequestError>
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync,
    {
        assert!(
            timeout != ResponseCollectionTimeout::None,
            "Calling `request_stream` without a timeout would block indefinitely on a dead responder!"
        );

        self.publisher
            .publish(request)
            .await
            .map_err(RequestError::SendingFailure)?;

        let mut stream = self
            .collector
            .collect::<StreamFrame<R::Item>>(request.reply_to(), None, timeout)
            .await
            .map_err(RequestError::ResponseCollectionFailed)?;

        let mut items = Vec::new();

        while let Some(frame) = stream.next().await {
            match frame.map_err(RequestError::ReceptionFailed)? {
                StreamFrame::Item(item) => items.push(item),
                StreamFrame::End => return Ok(items),
                StreamFrame::Failed(cause) => return Err(RequestError::RemoteFailure(cause)),
            }
        }

        Err(RequestError::StreamInterrupted)
    }
}
