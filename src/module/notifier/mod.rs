//! Notification management — consumes review event envelopes and owns the notification store

mod options;
mod services;

use crate::domain::storage::mongo::MongoNotificationStore;
use crate::domain::storage::NotificationStore;
use crate::harness::{Heart, Module, ServiceRunner};
use crate::library::communication::event::{
    ConsumerGroupDescriptor, ConsumerGroupIdentifier, QueueLocation,
};
use crate::library::BoxedError;
use async_trait::async_trait;
use jatsl::{schedule, JobScheduler};
use std::sync::Arc;
use tracing::{debug, instrument};

pub use options::Options;
use services::*;

/// Module implementation
pub struct Notifier {
    options: Options,
}

impl Notifier {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Notifier {
    #[instrument(skip(self, scheduler))]
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let redis_url = self.options.redis.url.clone();
        // Start at the queue head so envelopes published while no notifier was
        // running are still turned into notifications
        let group =
            ConsumerGroupDescriptor::new(ConsumerGroupIdentifier::Notifier, QueueLocation::Head);
        let consumer = self.options.queueing.id.to_string();

        debug!("Acquiring mongo connection");
        let database = self.options.mongo.database().await?;
        self.options
            .mongo
            .prepare_notification_collection(&database)
            .await?;
        let store: Arc<dyn NotificationStore> = Arc::new(MongoNotificationStore::new(&database));

        let ingest = ServiceRunner::<EnvelopeIngestService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let listing = ServiceRunner::<NotificationListingService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let mark_read = ServiceRunner::<MarkReadService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let mark_all_read = ServiceRunner::<MarkAllReadService>::new(
            redis_url,
            group,
            consumer,
            store,
        );

        debug!("Scheduling jobs");
        schedule!(scheduler, {
            ingest,
            listing,
            mark_read,
            mark_all_read
        });

        Ok(Some(Heart::without_heart_stone()))
    }
}
