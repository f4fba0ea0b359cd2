//! Login-mode decision logic.
//!
//! Pure functions over the facts of one attempt: did the directory accept
//! the principal, does a local account exist, and (when the mode asks for
//! it) is the principal in the required group. Side effects — the group
//! round trip and the provisioning call — are the broker's job.

use crate::config::{DirectoryConfig, LoginMode};
use crate::models::{LocalUser, LocalUserId, RejectReason};

/// What the broker should do with an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Accept the existing local account.
    Accept(LocalUserId),
    /// Provision a local account, then accept it.
    Provision,
    /// Reject with the given reason.
    Reject(RejectReason),
}

/// Login-mode decision engine.
#[derive(Debug, Clone)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Whether the configured mode needs a group membership check at all.
    ///
    /// The broker uses this to skip the group round trip for modes that
    /// never consult it.
    pub fn requires_group_check(config: &DirectoryConfig) -> bool {
        config.login_mode == LoginMode::CreateGroup
    }

    /// Decide the outcome of an attempt.
    ///
    /// `is_group_member` is `None` when the mode did not require a check;
    /// under [`LoginMode::CreateGroup`] missing evidence counts as
    /// non-membership.
    pub fn decide(
        principal_valid: bool,
        local_user: Option<&LocalUser>,
        is_group_member: Option<bool>,
        config: &DirectoryConfig,
    ) -> Decision {
        if !principal_valid {
            return Decision::Reject(RejectReason::InvalidCredentials);
        }

        let is_member = is_group_member.unwrap_or(false);

        match local_user {
            Some(user) => {
                if config.login_mode == LoginMode::CreateGroup && !is_member {
                    Decision::Reject(RejectReason::NotAuthorized)
                } else {
                    Decision::Accept(user.id)
                }
            }
            None => match config.login_mode {
                LoginMode::Auth => Decision::Reject(RejectReason::AccountCreationNotPermitted),
                LoginMode::Create => Decision::Provision,
                LoginMode::CreateGroup => {
                    if is_member {
                        Decision::Provision
                    } else {
                        Decision::Reject(RejectReason::NotAuthorized)
                    }
                }
            },
        }
    }
}
