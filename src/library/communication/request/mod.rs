//! Request/response communication on top of the event layer
//!
//! A [`Request`] is a [`Notification`](super::event::Notification) which additionally
//! carries a [`ResponseLocation`]. Responders consume the request queue like any other
//! notification queue and push their replies to the given location, where the
//! requesting side collects them.
//!
//! Bulk operations use the [`StreamingRequest`] flavour instead: the responder sends
//! each element of the result set as an individual [`StreamFrame::Item`] and concludes
//! with a [`StreamFrame::End`]. Any other conclusion of the reply channel is treated
//! as a hard failure of the call by the collecting side.

mod collector;
mod publisher;
mod request;
mod requestor;
mod responder;
mod stream;

pub use collector::*;
pub use publisher::*;
pub use request::*;
pub use requestor::*;
pub use responder::*;
pub use stream::*;
