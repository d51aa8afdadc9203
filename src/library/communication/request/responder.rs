use super::super::super::BoxedError;
use super::super::super::EmptyResult;
use super::super::event::Consumer;
use super::super::BlackboxError;
use super::Request;
use super::ResponsePublisher;
use super::StreamFrame;
use super::StreamingRequest;
use async_trait::async_trait;
use thiserror::Error;

/// Error that may be thrown while responding to a request
#[derive(Error, Debug)]
pub enum ResponderError {
    /// The processor threw an error
    #[error("processing request failed")]
    ProcessingFailed(#[source] BoxedError),
    /// Unable to deliver the response
    #[error("sending response failed")]
    ResponseUndeliverable(#[source] BoxedError),
}

/// Structure which processes requests and produces responses
#[async_trait]
pub trait RequestProcessor {
    /// Type of request to process
    type Request: Request;

    /// Handler for requests, returning a response
    async fn process(
        &self,
        request: Self::Request,
    ) -> Result<<Self::Request as Request>::Response, BoxedError>;
}

/// Structure which processes [`StreamingRequests`](StreamingRequest) and produces result sets
///
/// Producers return the full, materialized result set. Streaming happens purely at the
/// transport layer: the [`StreamingResponder`] sends each element individually so large
/// result sets can be transferred incrementally on the wire.
#[async_trait]
pub trait StreamSource {
    /// Type of request to process
    type Request: StreamingRequest;

    /// Handler for requests, returning the materialized result set
    async fn produce(
        &self,
        request: Self::Request,
    ) -> Result<Vec<<Self::Request as StreamingRequest>::Item>, BoxedError>;
}

/// Convenience wrapper to process requests and send responses
pub struct Responder<R, C: RequestProcessor<Request = R>, P> {
    processor: C,
    publisher: P,
}

impl<R, C, P> Responder<R, C, P>
where
    R: Request,
    C: RequestProcessor<Request = R>,
    P: ResponsePublisher,
{
    /// Creates a new responder from raw parts
    pub fn new(processor: C, publisher: P) -> Self {
        Self {
            processor,
            publisher,
        }
    }
}

#[async_trait]
impl<R, C, P> Consumer for Responder<R, C, P>
where
    R: Request + Send + Sync,
    R::Response: Send + Sync,
    C: RequestProcessor<Request = R> + Send + Sync,
    P: ResponsePublisher + Send + Sync,
{
    type Notification = R;

    async fn consume(&self, request: Self::Notification) -> EmptyResult {
        let location = request.reply_to();

        let response = self
            .processor
            .process(request)
            .await
            .map_err(ResponderError::ProcessingFailed)?;

        self.publisher
            .publish(&response, location)
            .await
            .map_err(ResponderError::ResponseUndeliverable)?;

        Ok(())
    }
}

/// Convenience wrapper to process streaming requests and send framed reply streams
///
/// Each element of the produced result set is sent as an individual
/// [`StreamFrame::Item`], concluded by a [`StreamFrame::End`]. The first failed send
/// aborts the operation immediately — no trailing frames are attempted, so the
/// collecting side observes a hard failure rather than a silently truncated list.
/// A failure of the source itself is reported to the caller as a
/// [`StreamFrame::Failed`] carrying the serialized error chain.
pub struct StreamingResponder<R, S: StreamSource<Request = R>, P> {
    source: S,
    publisher: P,
}

impl<R, S, P> StreamingResponder<R, S, P>
where
    R: StreamingRequest,
    S: StreamSource<Request = R>,
    P: ResponsePublisher,
{
    /// Creates a new streaming responder from raw parts
    pub fn new(source: S, publisher: P) -> Self {
        Self { source, publisher }
    }
}

#[async_trait]
impl<R, S, P> Consumer for StreamingResponder<R, S, P>
where
    R: StreamingRequest + Send + Sync,
    R::Item: Send + Sync,
    S: StreamSource<Request = R> + Send + Sync,
    P: ResponsePublisher + Send + Sync,
{
    type Notification = R;

    async fn consume(&self, request: Self::Notification) -> EmptyResult {
        let location = request.reply_to();

        match self.source.produce(request).await {
            Ok(items) => {
                for item in items {
                    self.publisher
                        .publish(&StreamFrame::Item(item), location.clone())
                        .await
                        .map_err(ResponderError::ResponseUndeliverable)?;
                }

                let end: StreamFrame<R::Item> = StreamFrame::End;
                self.publisher
                    .publish(&end, location)
                    .await
                    .map_err(ResponderError::ResponseUndeliverable)?;
            }
            Err(e) => {
                let failure: StreamFrame<R::Item> =
                    StreamFrame::Failed(BlackboxError::from_boxed(e));
                self.publisher
                    .publish(&failure, location)
                    .await
                    .map_err(ResponderError::ResponseUndeliverable)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::super::super::event::{Notification, QueueDescriptor};
    use super::super::ResponseLocation;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use thiserror::Error;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct NumbersRequest(usize);

    impl Notification for NumbersRequest {
        fn queue() -> QueueDescriptor {
            QueueDescriptor::new("numbers".into(), 42)
        }
    }

    impl StreamingRequest for NumbersRequest {
        type Item = usize;

        fn reply_to(&self) -> ResponseLocation {
            "somewhere".into()
        }
    }

    #[derive(Debug, Error)]
    #[error("numbers are unavailable")]
    struct NumbersUnavailable;

    struct NumbersSource {
        result: Result<Vec<usize>, ()>,
    }

    #[async_trait]
    impl StreamSource for NumbersSource {
        type Request = NumbersRequest;

        async fn produce(&self, request: Self::Request) -> Result<Vec<usize>, BoxedError> {
            self.result
                .clone()
                .map(|numbers| numbers.into_iter().take(request.0).collect())
                .map_err(|_| NumbersUnavailable.into())
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<(Value, ResponseLocation)>>,
        failing: bool,
    }

    #[async_trait]
    impl ResponsePublisher for RecordingPublisher {
        async fn publish<R: Send + Sync + Serialize>(
            &self,
            response: &R,
            location: ResponseLocation,
        ) -> EmptyResult {
            if self.failing {
                return Err(NumbersUnavailable.into());
            }

            self.sent
                .lock()
                .unwrap()
                .push((serde_json::to_value(response).unwrap(), location));

            Ok(())
        }
    }

    #[tokio::test]
    async fn frame_every_item_and_terminate() {
        let source = NumbersSource {
            result: Ok(vec![4, 8, 15]),
        };
        let publisher = RecordingPublisher::default();
        let responder = StreamingResponder::new(source, publisher);

        responder.consume(NumbersRequest(3)).await.unwrap();

        let sent = responder.publisher.sent.lock().unwrap();
        let frames: Vec<Value> = sent.iter().map(|(frame, _)| frame.clone()).collect();

        assert_eq!(
            frames,
            vec![
                json!({ "Item": 4 }),
                json!({ "Item": 8 }),
                json!({ "Item": 15 }),
                json!("End"),
            ]
        );
        assert!(sent.iter().all(|(_, location)| location == "somewhere"));
    }

    #[tokio::test]
    async fn close_empty_streams_cleanly() {
        let source = NumbersSource {
            result: Ok(Vec::new()),
        };
        let publisher = RecordingPublisher::default();
        let responder = StreamingResponder::new(source, publisher);

        responder.consume(NumbersRequest(0)).await.unwrap();

        let sent = responder.publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, json!("End"));
    }

    #[tokio::test]
    async fn report_source_failures_in_band() {
        let source = NumbersSource { result: Err(()) };
        let publisher = RecordingPublisher::default();
        let responder = StreamingResponder::new(source, publisher);

        responder.consume(NumbersRequest(1)).await.unwrap();

        let sent = responder.publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].0,
            json!({ "Failed": { "causes": ["numbers are unavailable"] } })
        );
    }

    #[tokio::test]
    async fn abort_on_the_first_failed_send() {
        let source = NumbersSource {
            result: Ok(vec![1, 2, 3]),
        };
        let publisher = RecordingPublisher {
            failing: true,
            ..Default::default()
        };
        let responder = StreamingResponder::new(source, publisher);

        let result = responder.consume(NumbersRequest(3)).await;

        assert!(result.is_err());
        assert!(responder.publisher.sent.lock().unwrap().is_empty());
    }
}
