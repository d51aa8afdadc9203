use super::super::BlackboxError;
use serde::{Deserialize, Serialize};

/// Wire frame of a streamed reply to a [`StreamingRequest`](super::StreamingRequest)
///
/// A well-formed reply consists of zero or more `Item` frames followed by exactly one
/// terminal frame (`End` or `Failed`). A reply channel that runs dry without a terminal
/// frame indicates that the responder died mid-stream and the call must be considered
/// failed — never a shorter-than-expected success.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum StreamFrame<T> {
    /// One element of the result set
    Item(T),
    /// The result set is complete
    End,
    /// The responder could not produce the result set
    Failed(BlackboxError),
}
