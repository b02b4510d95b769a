//! Form domain layer
//!
//! A [`FormState`] owns one form's field stores and hands out a stable
//! [`Controls`] handle for mutating them.

mod controls;
mod form_state;
mod listener;

pub use controls::Controls;
pub use form_state::{FormOptions, FormState};
pub use listener::{CallbackListener, FormListener, NoopListener};
