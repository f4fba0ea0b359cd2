//! The broker's single result type.

use crate::models::LocalUserId;

/// Why an authentication attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Username or password field was blank.
    EmptyCredentials,
    /// The directory could not be reached or rejected the application
    /// credentials.
    DirectoryUnavailable,
    /// The directory rejected the user's username/password.
    InvalidCredentials,
    /// The directory did not recognize the principal and the security mode
    /// permits the host to try its own authentication path.
    Deferred,
    /// Credentials were valid but the group/mode policy denies access.
    NotAuthorized,
    /// The login mode forbids provisioning a new local account.
    AccountCreationNotPermitted,
    /// The host's user store refused or failed the account operation.
    ProvisioningFailed,
    /// Attribute or group fetch failed after a valid principal token.
    LookupFailed,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectReason::EmptyCredentials => "username or password is empty",
            RejectReason::DirectoryUnavailable => "directory server unavailable",
            RejectReason::InvalidCredentials => "invalid credentials",
            RejectReason::Deferred => "deferred to local authentication",
            RejectReason::NotAuthorized => "not authorized by group policy",
            RejectReason::AccountCreationNotPermitted => "account creation not permitted",
            RejectReason::ProvisioningFailed => "local account provisioning failed",
            RejectReason::LookupFailed => "directory lookup failed",
        };
        write!(f, "{}", text)
    }
}

/// Result of one authentication attempt. Never a bare boolean: a rejection
/// always carries its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Accepted { user_id: LocalUserId },
    Rejected { reason: RejectReason },
}

impl AuthOutcome {
    pub fn accepted(user_id: LocalUserId) -> Self {
        AuthOutcome::Accepted { user_id }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        AuthOutcome::Rejected { reason }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, AuthOutcome::Accepted { .. })
    }

    /// True when the host may still try an alternative authentication path.
    ///
    /// Only `Deferred` permits fallback; policy rejections are final even
    /// under [`SecurityMode::Normal`](crate::config::SecurityMode::Normal).
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            AuthOutcome::Rejected {
                reason: RejectReason::Deferred
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_deferred_allows_fallback() {
        assert!(AuthOutcome::rejected(RejectReason::Deferred).allows_fallback());

        for reason in [
            RejectReason::EmptyCredentials,
            RejectReason::DirectoryUnavailable,
            RejectReason::InvalidCredentials,
            RejectReason::NotAuthorized,
            RejectReason::AccountCreationNotPermitted,
            RejectReason::ProvisioningFailed,
            RejectReason::LookupFailed,
        ] {
            assert!(!AuthOutcome::rejected(reason).allows_fallback());
        }

        assert!(!AuthOutcome::accepted(LocalUserId(1)).allows_fallback());
    }
}
