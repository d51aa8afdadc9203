//! Domain specific data structures and contracts of the essay publishing platform

pub mod event;
pub mod request;
pub mod storage;

mod essay;
mod notification;
mod review;

pub use essay::*;
pub use notification::*;
pub use review::*;

/// Unique identifier of an essay, assigned by the essay store
pub type EssayIdentifier = i64;

/// Unique identifier of a review, assigned by the review store
pub type ReviewIdentifier = i64;

/// Unique identifier of a notification, assigned by the notification store
pub type NotificationIdentifier = i64;

/// Unique identifier of a user account
pub type UserIdentifier = i64;
