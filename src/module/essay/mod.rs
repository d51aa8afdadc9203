//! Essay management — stores essays and assembles the detailed essay view

mod options;
mod services;

use crate::domain::storage::mongo::MongoEssayStore;
use crate::domain::storage::EssayStore;
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
pub struct Essay {
    options: Options,
}

impl Essay {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Essay {
    #[instrument(skip(self, scheduler))]
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let redis_url = self.options.redis.url.clone();
        let group =
            ConsumerGroupDescriptor::new(ConsumerGroupIdentifier::Essay, QueueLocation::Head);
        let consumer = self.options.queueing.id.to_string();

        debug!("Acquiring mongo connection");
        let database = self.options.mongo.database().await?;
        self.options.mongo.prepare_essay_collection(&database).await?;
        let store: Arc<dyn EssayStore> = Arc::new(MongoEssayStore::new(&database));

        let creation = ServiceRunner::<EssayCreationService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let listing = ServiceRunner::<EssayListingService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let search = ServiceRunner::<EssaySearchService>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let detail = ServiceRunner::<EssayDetailService<_>>::new(
            redis_url.clone(),
            group.clone(),
            consumer.clone(),
            store.clone(),
        );

        let removal = ServiceRunner::<EssayRemovalService>::new(
            redis_url,
            group,
            consumer,
            store,
        );

        debug!("Scheduling jobs");
        schedule!(scheduler, {
            creation,
            listing,
            search,
            detail,
            removal
        });

        Ok(Some(Heart::without_heart_stone()))
    }
}
