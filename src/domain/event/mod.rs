//! Domain specific event [`Notifications`](crate::library::communication::event::Notification)

mod new_review;

pub use new_review::*;
