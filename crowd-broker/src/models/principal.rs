//! Directory-side session and principal types.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::UserProfile;

/// Attribute names the directory uses for profile fields.
pub const ATTR_GIVEN_NAME: &str = "givenName";
pub const ATTR_SURNAME: &str = "sn";
pub const ATTR_MAIL: &str = "mail";
pub const ATTR_DISPLAY_NAME: &str = "displayName";

/// Token proving the broker's own service identity to the directory.
///
/// Owned exclusively by the directory client; distinct from any user's
/// session.
#[derive(Debug, Clone)]
pub struct ApplicationSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl ApplicationSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.issued_at
    }
}

/// Opaque token for one user's verified session with the directory.
///
/// Valid for the duration of a single login attempt; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalToken(String);

impl PrincipalToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request context forwarded to the directory as validation factors.
///
/// Directories may use these for audit trails or lockout decisions, so the
/// values are sent verbatim from the inbound request.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub user_agent: String,
    pub remote_address: String,
}

impl ClientContext {
    pub fn new(user_agent: impl Into<String>, remote_address: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            remote_address: remote_address.into(),
        }
    }
}

/// Profile attributes the directory holds for a principal.
#[derive(Debug, Clone, Default)]
pub struct PrincipalAttributes {
    attributes: HashMap<String, Vec<String>>,
}

impl PrincipalAttributes {
    pub fn new(attributes: HashMap<String, Vec<String>>) -> Self {
        Self { attributes }
    }

    /// First value of the named attribute, if present and non-empty.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Build a provisioning profile for the given login name and role.
    ///
    /// The display name prefers the directory's own `displayName`, then
    /// "givenName sn", and falls back to the username when the directory
    /// carries no name attributes at all.
    pub fn to_profile(&self, username: &str, role: &str) -> UserProfile {
        let first_name = self.first(ATTR_GIVEN_NAME).unwrap_or_default().to_string();
        let last_name = self.first(ATTR_SURNAME).unwrap_or_default().to_string();

        let display_name = match self.first(ATTR_DISPLAY_NAME) {
            Some(name) => name.to_string(),
            None => {
                let full = format!("{} {}", first_name, last_name);
                let full = full.trim().to_string();
                if full.is_empty() {
                    username.to_string()
                } else {
                    full
                }
            }
        };

        UserProfile {
            username: username.to_string(),
            display_name,
            first_name,
            last_name,
            email: self.first(ATTR_MAIL).unwrap_or_default().to_string(),
            role: role.to_string(),
        }
    }
}
