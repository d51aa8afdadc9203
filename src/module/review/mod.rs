//! Review management — stores peer reviews and announces each stored one

mod options;
mod publisher;
mod services;

use crate::domain::storage::mongo::MongoReviewStore;
use crate::domain::storage::ReviewStore;
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
pub use publisher::{
    event_relay, EventRelayHandle, EventRelayJob, PublicationMode, PublicationTally,
};
use services::*;

/// Module implementation
pub struct Review {
    options: Options,
}

impl Review {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Review {
    #[instrument(skip(self, scheduler))]
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let redis_url = self.options.redis.url.clone();
        let group =
            ConsumerGroupDescriptor::new(ConsumerGroupIdentifier::Review, QueueLocation::Head);
        let consumer = self.options.queueing.id.to_string();

        debug!("Acquiring mongo connection");
        let database = self.options.mongo.database().await?;
        self.options.mongo.prepare_review_collection(&database).await?;
        let store: Arc<dyn ReviewStore> = Arc::new(MongoReviewStore::new(&database));

        let mode = if self.options.synchronous_events {
            PublicationMode::Immediate
        } else {
            PublicationMode::Queued
        };

        let (relay, relay_job) =
            event_relay(self.options.relay_queue_capacity, redis_url.clone());

        let creation = ServiceRunner::<ReviewCreationService<_>>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            ReviewCreationConfig {
                store: store.clone(),
                relay,
                mode,
                tally: relay_job.tally(),
            },
        );

        let listing = ServiceRunner::<ReviewListingService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let by_essay = ServiceRunner::<ReviewsByEssayService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let removal = ServiceRunner::<ReviewRemovalService>::new(
            redis_url,
            group,
            consumer,
            store,
        );

        debug!("Scheduling jobs");
        schedule!(scheduler, {
            relay_job,
            creation,
            listing,
            by_essay,
            removal
        });

        Ok(Some(Heart::without_heart_stone()))
    }
}
