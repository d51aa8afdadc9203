mod creation;
mod listing;
mod removal;

pub use creation::*;
pub use listing::*;
pub use removal::*;
