use super::super::event::Notification;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Describes a location where a response should be sent to
///
/// References a list data structure on which the requesting service can block on and
/// which may hold more than one reply. Carries a lower overhead than a Queue
/// but responses can only be consumed by one service (usually the requesting one).
/// Also cleans up after itself once all responses have been processed as opposed to a Queue
/// which requires explicit deletion.
pub type ResponseLocation = String;

/// Query for information which can be replied to with a single response
///
/// Note that the response will not be acknowledged, so it may get lost and the
/// request can and will get repeated eventually. Requests with side effects thus
/// have to either be idempotent or tolerate re-execution.
pub trait Request: Notification {
    /// Expected response type
    type Response: Serialize + DeserializeOwned + Debug + PartialEq;

    /// Location where the reply should be sent to
    fn reply_to(&self) -> ResponseLocation;
}

/// Query for a result set which is replied to as a stream of individual items
///
/// The responder wraps every element into a [`StreamFrame`](super::StreamFrame) and
/// terminates the reply with an explicit end-of-stream marker, so the collecting side
/// can distinguish a complete (possibly empty) result set from an interrupted one.
pub trait StreamingRequest: Notification {
    /// Type of the individual elements in the reply stream
    type Item: Serialize + DeserializeOwned + Debug + PartialEq;

    /// Location where the reply frames should be sent to
    fn reply_to(&self) -> ResponseLocation;
}
