mod creation;
mod detail;
mod listing;
mod removal;

pub use creation::*;
pub use detail::*;
pub use listing::*;
pub use removal::*;
