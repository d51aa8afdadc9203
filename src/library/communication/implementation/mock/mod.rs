mod factory;
mod notification_publisher;
mod queue_provider;
mod requestor;
mod response_collector;
mod response_publisher;

pub use factory::*;
pub use notification_publisher::*;
pub use queue_provider::*;
pub use requestor::*;
pub use response_collector::*;
pub use response_publisher::*;

#[derive(Clone, PartialEq, Eq)]
pub enum ExpectationMode {
    /// No validity checks of any sort, just a dummy
    Ignore,
    /// Only allows expected items and requires all of them
    ExpectOnlyProvided,
    /// Allows intermittent noise but still requires all expected
    /// items to eventually be published
    AllowNoise,
}
