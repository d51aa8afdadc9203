use crate::library::communication::event::{Notification, QueueDescriptor};
use crate::library::communication::request::{
    Request, RequestError, Requestor, ResponseCollectionTimeout, StreamAggregator,
    StreamingRequest,
};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

enum ExpectedReply {
    /// Unary responses for a [`Request`]
    Unary(Vec<Value>),
    /// A complete item stream for a [`StreamingRequest`]
    Stream(Vec<Value>),
    /// A stream that breaks off without an end-of-stream marker
    InterruptedStream(Vec<Value>),
}

struct ExpectedRequest {
    serialized: Value,
    queue: QueueDescriptor,
    reply: ExpectedReply,
}

impl Default for MockRequestor {
    fn default() -> Self {
        MockRequestor {
            remaining: Arc::new(AtomicUsize::new(0)),
            expected: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

#[derive(Clone)]
pub struct MockRequestor {
    remaining: Arc<AtomicUsize>,
    expected: Arc<Mutex<VecDeque<ExpectedRequest>>>,
}

impl MockRequestor {
    pub fn expect_and_respond<R>(&self, request: &R, responses: Vec<R::Response>) -> &Self
    where
        R: Request + Send + Sync,
        R::Response: Send + Sync,
    {
        let serialized_responses = responses
            .into_iter()
            .map(serde_json::to_value)
            .map(|r| r.unwrap())
            .collect();

        self.add_expectation::<R>(request, ExpectedReply::Unary(serialized_responses))
    }

    pub fn expect_and_stream<R>(&self, request: &R, items: Vec<R::Item>) -> &Self
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync,
    {
        let serialized_items = items
            .into_iter()
            .map(serde_json::to_value)
            .map(|i| i.unwrap())
            .collect();

        self.add_expectation::<R>(request, ExpectedReply::Stream(serialized_items))
    }

    /// Expects a streaming request whose reply breaks off after the given items,
    /// without ever delivering an end-of-stream marker
    pub fn expect_and_interrupt<R>(&self, request: &R, items: Vec<R::Item>) -> &Self
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync,
    {
        let serialized_items = items
            .into_iter()
            .map(serde_json::to_value)
            .map(|i| i.unwrap())
            .collect();

        self.add_expectation::<R>(request, ExpectedReply::InterruptedStream(serialized_items))
    }

    fn add_expectation<N: Notification>(&self, request: &N, reply: ExpectedReply) -> &Self {
        let serialized_request = serde_json::to_value(request).unwrap();

        println!("EXP REQ {} {}", N::queue().key(), serialized_request);

        self.expected.lock().unwrap().push_back(ExpectedRequest {
            serialized: serialized_request,
            queue: N::queue(),
            reply,
        });

        self.remaining.fetch_add(1, Ordering::SeqCst);
        self
    }

    fn pop_matching<R: Notification>(&self, request: &R) -> ExpectedReply {
        self.remaining.fetch_sub(1, Ordering::SeqCst);

        let serialized = serde_json::to_value(request).unwrap();
        println!("REQ {} {:?}", R::queue().key(), serialized);

        match self.expected.lock().unwrap().pop_front() {
            Some(expected) => {
                assert_eq!(
                    expected.queue,
                    R::queue(),
                    "Request queue (right) did not match expectation (left)"
                );

                let deserialized_expected: R = serde_json::from_value(expected.serialized)
                    .expect("Failed to deserialize expected request");

                assert_eq!(deserialized_expected, *request);

                expected.reply
            }
            None => panic!(
                "Received unexpected request on {}: {:?}",
                R::queue().key(),
                serialized
            ),
        }
    }
}

#[async_trait]
impl Requestor for Arc<MockRequestor> {
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

        match self.pop_matching(request) {
            ExpectedReply::Unary(responses) => Ok(responses
                .into_iter()
                .map(serde_json::from_value)
                .map(|r| r.expect("Failed to deserialize response"))
                .collect()),
            _ => panic!("Unary request received where a stream was expected"),
        }
    }
}

#[async_trait]
impl StreamAggregator for Arc<MockRequestor> {
    async fn request_stream<R>(
        &self,
        request: &R,
        _timeout: ResponseCollectionTimeout,
    ) -> Result<Vec<R::Item>, RequestError>
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync,
    {
        match self.pop_matching(request) {
            ExpectedReply::Stream(items) => Ok(items
                .into_iter()
                .map(serde_json::from_value)
                .map(|i| i.expect("Failed to deserialize item"))
                .collect()),
            ExpectedReply::InterruptedStream(_) => Err(RequestError::StreamInterrupted),
            ExpectedReply::Unary(_) => panic!("Streaming request received where a unary response was expected"),
        }
    }
}

impl Drop for MockRequestor {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let remaining = self.remaining.load(Ordering::SeqCst);

            if remaining > 0 {
                panic!(
                    "MockRequestor was dropped with {} expected requests remaining",
                    remaining
                );
            }
        }
    }
}
