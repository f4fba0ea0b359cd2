//! Local user types at the host application boundary.

use serde::{Deserialize, Serialize};

/// Stable identifier assigned by the host's user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalUserId(pub i64);

impl std::fmt::Display for LocalUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account that already exists in the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUser {
    pub id: LocalUserId,
    pub username: String,
}

impl LocalUser {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id: LocalUserId(id),
            username: username.into(),
        }
    }
}

/// Profile handed to the host's user store when provisioning a new account.
///
/// Built from directory attributes; never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}
