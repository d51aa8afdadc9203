//! Structures for communication between services in a distributed system
//!
//! There are two modes of operation:
//!
//! 1. Publish and subscribe
//! 2. Request and response
//!
//! The first is used primarily for event notifications which make up the
//! event-driven architecture. Whenever something noteworthy happens in the
//! system, a notification describing what happened will be published.
//! The notification data structure implements the [`Notification`](event::Notification) trait and
//! thus describes where to expect it in a type-safe manner.
//! In this mode, everybody can publish notifications and all interested parties
//! can listen in and react to published event notifications. For more details and
//! a more in-depth explanation, consult the [`event`] module.
//!
//! The second mode of operation is request and response. A component publishes a
//! [`Request`](request::Request) which carries a response channel, and a responding
//! service sends either a single response or — for bulk operations — a stream of
//! individually framed items terminated by an explicit end-of-stream marker
//! (see [`StreamFrame`](request::StreamFrame)).

mod communication_factory;
mod error;

pub mod event;
pub mod implementation;
pub mod request;

pub use communication_factory::CommunicationFactory;
pub use error::BlackboxError;
