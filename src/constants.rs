//! Constants shared by more than one module

/// Number of event envelopes retained on the notification queue
pub const QUEUE_SIZE_EVENTS: usize = 10_000;

/// Number of requests retained on each operation queue
pub const QUEUE_SIZE_REQUESTS: usize = 1_000;

/// Tag carried by event envelopes emitted after a review has been stored
pub const EVENT_KIND_NEW_REVIEW: &str = "new_review";
