//! Password and allow-list gate with failed-attempt lockout.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_LOCKOUT_SECS, DEFAULT_MAX_LOGIN_ATTEMPTS, ServerSettings};

/// Reasons an authentication attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Too many failed attempts, try again in {} seconds", .retry_after.as_secs())]
    LockedOut { retry_after: Duration },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is not an administrator")]
    NotAllowed,
}

/// When repeated failures lock a user out, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures that trigger the lockout.
    pub max_attempts: u32,

    /// Window measured from the most recent failure.
    pub cooldown: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            cooldown: Duration::from_secs(DEFAULT_LOCKOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    failures: u32,
    last_attempt: Instant,
}

/// Guards catalog mutations behind a shared password and an admin allow-list.
#[derive(Debug)]
pub struct AdminGate {
    /// Shared admin password.
    secret: String,

    /// Telegram user ids allowed to authenticate.
    allowed_ids: HashSet<i64>,

    /// Lockout policy.
    policy: LockoutPolicy,

    /// Failed attempts per user id. Never persisted.
    attempts: Mutex<HashMap<i64, AttemptRecord>>,
}

impl AdminGate {
    /// Creates a new gate.
    #[must_use]
    pub fn new(
        secret: impl Into<String>,
        allowed_ids: impl IntoIterator<Item = i64>,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            secret: secret.into(),
            allowed_ids: allowed_ids.into_iter().collect(),
            policy,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a gate from server settings.
    #[must_use]
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self::new(
            settings.admin_password.clone(),
            settings.allowed_admin_ids.iter().copied(),
            LockoutPolicy {
                max_attempts: settings.max_login_attempts,
                cooldown: settings.lockout_window(),
            },
        )
    }

    /// Returns true if the credentials are accepted.
    pub async fn authenticate(&self, password: &str, user_id: i64) -> bool {
        self.verify(password, user_id).await.is_ok()
    }

    /// Checks credentials, recording the outcome against `user_id`.
    ///
    /// A refused attempt increments the user's failure counter and restarts
    /// the lockout window, even while already locked out. A successful one
    /// clears the counter.
    pub async fn verify(&self, password: &str, user_id: i64) -> Result<(), AuthError> {
        self.verify_at(password, user_id, Instant::now()).await
    }

    async fn verify_at(
        &self,
        password: &str,
        user_id: i64,
        now: Instant,
    ) -> Result<(), AuthError> {
        let mut attempts = self.attempts.lock().await;

        // Records whose window has elapsed start over from zero.
        let before = attempts.len();
        let cooldown = self.policy.cooldown;
        attempts.retain(|_, r| now.saturating_duration_since(r.last_attempt) < cooldown);
        if attempts.len() < before {
            debug!("Dropped {} expired attempt records", before - attempts.len());
        }

        let locked = attempts
            .get(&user_id)
            .is_some_and(|r| r.failures >= self.policy.max_attempts);

        let outcome = if locked {
            Err(AuthError::LockedOut {
                retry_after: self.policy.cooldown,
            })
        } else if password != self.secret {
            Err(AuthError::InvalidCredentials)
        } else if !self.allowed_ids.contains(&user_id) {
            Err(AuthError::NotAllowed)
        } else {
            Ok(())
        };

        match &outcome {
            Ok(()) => {
                attempts.remove(&user_id);
                info!("Admin {} authenticated", user_id);
            }
            Err(e) => {
                let record = attempts.entry(user_id).or_insert(AttemptRecord {
                    failures: 0,
                    last_attempt: now,
                });
                record.failures = record.failures.saturating_add(1);
                record.last_attempt = now;
                warn!(
                    "Authentication failed for user {} ({} failures): {}",
                    user_id, record.failures, e
                );
            }
        }

        outcome
    }

    /// Checks whether a user is currently locked out.
    pub async fn is_locked_out(&self, user_id: i64) -> bool {
        self.is_locked_out_at(user_id, Instant::now()).await
    }

    async fn is_locked_out_at(&self, user_id: i64, now: Instant) -> bool {
        let attempts = self.attempts.lock().await;
        attempts.get(&user_id).is_some_and(|r| {
            r.failures >= self.policy.max_attempts
                && now.saturating_duration_since(r.last_attempt) < self.policy.cooldown
        })
    }

    /// Returns the failures recorded in the current window.
    pub async fn failed_attempts(&self, user_id: i64) -> u32 {
        let attempts = self.attempts.lock().await;
        attempts
            .get(&user_id)
            .filter(|r| r.last_attempt.elapsed() < self.policy.cooldown)
            .map_or(0, |r| r.failures)
    }

    /// Returns the active lockout policy.
    #[must_use]
    pub const fn policy(&self) -> LockoutPolicy {
        self.policy
    }
}
