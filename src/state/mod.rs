//! Field state module

mod forms;
mod initial_values;
pub(crate) mod notify;
mod snapshot;
mod store;

pub use forms::*;
pub use initial_values::*;
pub use notify::Subscription;
pub use snapshot::*;
pub use store::*;
