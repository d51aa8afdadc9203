//! Various options usable by modules
//!
//! The structs in this module allow other modules to flatten them into
//! their own options struct. This allows for a unified yet non-cluttered
//! option set.

use bson::{doc, Document};
use mongodb::options::{CreateIndexOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use structopt::StructOpt;
use tracing::trace;

/// Options for connecting to the Redis server
#[derive(Debug, StructOpt)]
pub struct RedisOptions {
    /// Redis database server URL
    #[structopt(
        short = "r",
        long = "redis",
        env = "REDIS",
        global = true,
        default_value = "redis://scriptorium-redis/",
        value_name = "url"
    )]
    pub url: String,
}

/// Options relevant for message queueing
#[derive(Debug, StructOpt)]
pub struct QueueingOptions {
    /// Unique and stable identifier for this instance.
    /// It is used to identify and resume work after a crash
    /// or deliberate restart, thus it may not change across
    /// executions!
    #[structopt(env)]
    pub id: String,
}

/// Options regarding the permanent storage backend
#[derive(Debug, StructOpt)]
pub struct MongoDbOptions {
    /// MongoDB connection URL
    #[structopt(long, env)]
    mongodb: String,

    /// Name of the database to use
    #[structopt(long, env, default_value = "scriptorium")]
    database: String,
}

impl MongoDbOptions {
    /// Instantiates a new database client instance
    pub async fn client(&self) -> mongodb::error::Result<Client> {
        Client::with_uri_str(&self.mongodb).await
    }

    /// Instantiates a new database connection based on a new client
    pub async fn database(&self) -> mongodb::error::Result<Database> {
        Ok(self.client().await?.database(&self.database))
    }

    /// Ensures the indexes backing the essay store exist
    ///
    /// The text index is what the content similarity search delegates its ranking to.
    pub async fn prepare_essay_collection(
        &self,
        database: &Database,
    ) -> mongodb::error::Result<()> {
        let essays = database.collection::<Document>("essays");

        trace!("Ensuring that the unique author index exists");
        let author_index = IndexModel::builder()
            .keys(doc! { "author": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        essays
            .create_index(author_index, CreateIndexOptions::default())
            .await?;

        trace!("Ensuring that the content text index exists");
        let content_index = IndexModel::builder().keys(doc! { "content": "text" }).build();
        essays
            .create_index(content_index, CreateIndexOptions::default())
            .await?;

        Ok(())
    }

    /// Ensures the indexes backing the review store exist
    pub async fn prepare_review_collection(
        &self,
        database: &Database,
    ) -> mongodb::error::Result<()> {
        let reviews = database.collection::<Document>("reviews");

        trace!("Ensuring that the essay reference index exists");
        let essay_index = IndexModel::builder().keys(doc! { "essayId": 1 }).build();
        reviews
            .create_index(essay_index, CreateIndexOptions::default())
            .await?;

        Ok(())
    }

    /// Ensures the indexes backing the notification store exist
    pub async fn prepare_notification_collection(
        &self,
        database: &Database,
    ) -> mongodb::error::Result<()> {
        let notifications = database.collection::<Document>("notifications");

        trace!("Ensuring that the recipient index exists");
        let recipient_index = IndexModel::builder()
            .keys(doc! { "recipient": 1, "createdAt": -1 })
            .build();
        notifications
            .create_index(recipient_index, CreateIndexOptions::default())
            .await?;

        Ok(())
    }
}
