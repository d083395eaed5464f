//! Configuration module for the navigator backend.
//!
//! Handles loading and validation of server settings from the
//! environment, including admin credentials and lockout policy.

mod settings;

pub use settings::{ConfigError, ServerSettings};

/// Default number of failed logins before an admin id is locked out.
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Default lockout window in seconds, measured from the last failed attempt.
pub const DEFAULT_LOCKOUT_SECS: u64 = 300;
