//! Host application user-store seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LocalUser, LocalUserId, UserProfile};

/// Errors from the host's user store. Any of these surfaces to the caller
/// as a provisioning failure; the broker never retries a creation.
#[derive(Debug, Clone, Error)]
pub enum UserStoreError {
    #[error("user lookup failed: {0}")]
    Lookup(String),

    #[error("user creation failed: {0}")]
    Create(String),

    #[error("user already exists: {0}")]
    Duplicate(String),
}

/// The host application's local account primitives.
///
/// Implemented by the host over whatever storage it owns. The broker only
/// reads and, depending on the login mode, creates accounts — it never
/// updates or deletes them, and it never hands a password to the store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a local account by login name. The match must be
    /// case-insensitive: `Alice` and `alice` are the same account.
    async fn find_by_username(&self, username: &str)
        -> Result<Option<LocalUser>, UserStoreError>;

    /// Create a local account from a provisioned profile and return its
    /// stable identifier. Called at most once per accepted login.
    async fn create_user(&self, profile: &UserProfile) -> Result<LocalUserId, UserStoreError>;
}
