use crate::module::options::{MongoDbOptions, QueueingOptions, RedisOptions};
use structopt::StructOpt;

/// Options for the review module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub queueing: QueueingOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub redis: RedisOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub mongo: MongoDbOptions,

    /// Publish event envelopes before replying instead of handing them to the
    /// background relay queue
    ///
    /// Adds broker latency to every review creation; intended for test and
    /// verification setups that need to deterministically observe delivery.
    #[structopt(long)]
    pub synchronous_events: bool,

    /// Number of event envelopes the relay queue holds before dropping new ones
    #[structopt(long, env, default_value = "1024")]
    pub relay_queue_capacity: usize,
}
