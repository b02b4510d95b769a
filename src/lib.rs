//! Form State - field-level state container for interactive forms
//!
//! Tracks, per named field, a current value, a touched flag, a validity flag
//! and an error payload. Validity and errors are computed by the caller; this
//! crate only stores and propagates them.
//!
//! ```
//! use form_state::{FormOptions, FormState};
//!
//! let form: FormState<String, String> =
//!     FormState::from_options(FormOptions::new().field("name", "Alice".to_string()));
//! form.record_initial_value("name", "Alice".to_string());
//!
//! let controls = form.controls();
//! controls.set_field("name", "Bob".to_string());
//! assert_eq!(form.current().value("name").map(String::as_str), Some("Bob"));
//! assert!(form.current().is_touched("name"));
//!
//! controls.reset_field("name");
//! assert_eq!(form.current().value("name").map(String::as_str), Some("Alice"));
//! assert!(!form.current().is_touched("name"));
//! ```

pub mod config;
pub mod error;
mod state;

#[cfg(test)]
mod test_support;

pub use config::FormConfig;
pub use error::{FormError, Result};
pub use state::*;
