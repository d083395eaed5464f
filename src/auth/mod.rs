//! Admin authentication module.
//!
//! Checks a shared password and Telegram user id against the configured
//! allow-list, locking out ids that keep failing.

mod gate;

pub use gate::{AdminGate, AuthError, LockoutPolicy};
