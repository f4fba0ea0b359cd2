//! Wire types for the directory security-server RPC binding.
//!
//! The JSON bodies preserve the directory's original call shapes: camelCase
//! field names, passwords wrapped in a `credential` object, and validation
//! factors as a list of name/value pairs.

use serde::{Deserialize, Serialize};

use crate::models::ClientContext;

/// A password wrapped the way the directory expects credentials on the wire.
#[derive(Serialize)]
pub struct PasswordCredential {
    pub credential: String,
}

impl PasswordCredential {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
        }
    }
}

// Keep passwords out of any debug rendering of a request.
impl std::fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("credential", &"[redacted]")
            .finish()
    }
}

/// The application's identity on principal-level calls: registered name plus
/// the session token from `authenticate_application`.
#[derive(Debug, Clone, Serialize)]
pub struct AppIdentity {
    pub name: String,
    pub token: String,
}

/// Audit context item forwarded with a principal authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFactor {
    pub name: String,
    pub value: String,
}

impl ValidationFactor {
    /// The two factors the directory expects, taken verbatim from the
    /// inbound request.
    pub fn from_context(ctx: &ClientContext) -> Vec<ValidationFactor> {
        vec![
            ValidationFactor {
                name: "User-Agent".to_string(),
                value: ctx.user_agent.clone(),
            },
            ValidationFactor {
                name: "remote_address".to_string(),
                value: ctx.remote_address.clone(),
            },
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct AppAuthRequest {
    pub name: String,
    pub credential: PasswordCredential,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalAuthRequest {
    pub application: AppIdentity,
    pub name: String,
    pub credential: PasswordCredential,
    pub validation_factors: Vec<ValidationFactor>,
}

/// Request body for token-keyed principal operations (attribute fetch,
/// group lookup, invalidation).
#[derive(Debug, Serialize)]
pub struct PrincipalTokenRequest {
    pub application: AppIdentity,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTokenRequest {
    pub application: AppIdentity,
    pub token: String,
    pub validation_factors: Vec<ValidationFactor>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Group membership list. A missing or null `groups` field from the server
/// counts as "no groups"; transport failures never reach this type.
#[derive(Debug, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl GroupsResponse {
    pub fn into_groups(self) -> Vec<String> {
        self.groups.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidResponse {
    pub valid: bool,
}
