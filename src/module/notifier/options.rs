use crate::module::options::{MongoDbOptions, QueueingOptions, RedisOptions};
use structopt::StructOpt;

/// Options for the notifier module
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
}
