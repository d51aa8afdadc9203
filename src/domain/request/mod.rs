//! Domain specific [`Request`](crate::library::communication::request::Request) and
//! [`StreamingRequest`](crate::library::communication::request::StreamingRequest) structures
//!
//! Every request carries a randomly assigned response location which is excluded from
//! equality comparisons, so request values can be compared structurally in tests.

mod essay;
mod notification;
mod review;

pub use essay::*;
pub use notification::*;
pub use review::*;
