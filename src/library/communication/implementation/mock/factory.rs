use std::sync::Arc;

use super::{
    MockNotificationPublisher, MockQueueProvider, MockRequestor, MockResponseCollector,
    MockResponsePublisher,
};
use crate::library::communication::event::Notification;
use crate::library::communication::request::{Request, StreamingRequest};
use crate::library::communication::CommunicationFactory;

pub struct MockCommunicationFactory {
    publisher: Arc<MockNotificationPublisher>,
    requestor: Arc<MockRequestor>,
    response_publisher: Arc<MockResponsePublisher>,
}

impl CommunicationFactory for MockCommunicationFactory {
    type QueueProvider = MockQueueProvider;
    type NotificationPublisher = Arc<MockNotificationPublisher>;

    type Requestor = Arc<MockRequestor>;

    type ResponseCollector = MockResponseCollector;
    type ResponsePublisher = Arc<MockResponsePublisher>;

    fn queue_provider(&self) -> Self::QueueProvider {
        MockQueueProvider::default()
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        self.publisher.clone()
    }

    fn requestor(&self) -> Self::Requestor {
        self.requestor.clone()
    }

    fn response_collector(&self) -> Self::ResponseCollector {
        MockResponseCollector::default()
    }

    fn response_publisher(&self) -> Self::ResponsePublisher {
        self.response_publisher.clone()
    }
}

impl Default for MockCommunicationFactory {
    fn default() -> Self {
        Self {
            publisher: Arc::new(MockNotificationPublisher::default()),
            requestor: Arc::new(MockRequestor::default()),
            response_publisher: Arc::new(MockResponsePublisher::default()),
        }
    }
}

// Provide shorthands for the publisher / requestor methods
impl MockCommunicationFactory {
    pub fn expect_and_respond<R>(&self, request: &R, responses: Vec<R::Response>) -> &Self
    where
        R: Request + Send + Sync,
        R::Response: Send + Sync,
    {
        self.requestor.expect_and_respond(request, responses);
        self
    }

    pub fn expect_and_stream<R>(&self, request: &R, items: Vec<R::Item>) -> &Self
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync,
    {
        self.requestor.expect_and_stream(request, items);
        self
    }

    pub fn expect_and_interrupt<R>(&self, request: &R, items: Vec<R::Item>) -> &Self
    where
        R: StreamingRequest + Send + Sync,
        R::Item: Send + Sync,
    {
        self.requestor.expect_and_interrupt(request, items);
        self
    }

    pub fn expect<N: Notification + Send + Sync>(&self, notification: &N) -> &Self {
        self.publisher.expect(notification);
        self
    }

    /// Handle to the recording response publisher shared by instantiated services
    pub fn published_responses(&self) -> Arc<MockResponsePublisher> {
        self.response_publisher.clone()
    }
}
