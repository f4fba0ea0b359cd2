//! Authentication broker: the single entry point for login attempts.

use anyhow::Result;
use std::sync::Arc;

use crate::config::{ConfigError, DirectoryConfig, SecurityMode};
use crate::models::{AuthOutcome, ClientContext, PrincipalToken, RejectReason};
use crate::services::directory::DirectoryClient;
use crate::services::error::DirectoryError;
use crate::services::policy::{Decision, PolicyEngine};
use crate::services::store::UserStore;
use crate::services::transport::{DirectoryTransport, HttpTransport};

/// Coordinates the directory client and the policy engine for one login
/// attempt and enforces the security-mode gate.
///
/// Holds no per-attempt state; the only thing shared across attempts is the
/// application session cached inside the [`DirectoryClient`].
#[derive(Clone)]
pub struct AuthBroker {
    config: DirectoryConfig,
    directory: DirectoryClient,
    users: Arc<dyn UserStore>,
}

impl AuthBroker {
    /// Rejects configurations that would make the broker misbehave at login
    /// time, such as the group mode without a group to check.
    pub fn new(
        config: DirectoryConfig,
        transport: Arc<dyn DirectoryTransport>,
        users: Arc<dyn UserStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let directory = DirectoryClient::new(&config, transport);
        Ok(Self {
            config,
            directory,
            users,
        })
    }

    /// Build a broker with the bundled HTTP transport.
    pub fn from_config(config: DirectoryConfig, users: Arc<dyn UserStore>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::new(config, transport, users)?)
    }

    /// Authenticate one `(username, password)` pair.
    ///
    /// Never returns a transport error: every fault path maps to a typed
    /// [`RejectReason`]. Under [`SecurityMode::Normal`] an unrecognized
    /// principal comes back as `Deferred`, telling the host it may try its
    /// own authentication path; under [`SecurityMode::Strict`] every
    /// rejection is final.
    pub async fn attempt_login(
        &self,
        username: &str,
        password: &str,
        ctx: &ClientContext,
    ) -> AuthOutcome {
        if username.trim().is_empty() || password.trim().is_empty() {
            tracing::warn!("login attempt with empty credentials");
            return AuthOutcome::rejected(RejectReason::EmptyCredentials);
        }

        // Establish (or reuse) the application session before any principal
        // operation.
        if let Err(e) = self.directory.session().await {
            tracing::warn!(error = %e, "directory unavailable during application authentication");
            return AuthOutcome::rejected(RejectReason::DirectoryUnavailable);
        }

        let token = match self
            .directory
            .authenticate_principal(username, password, ctx)
            .await
        {
            Ok(token) => token,
            Err(DirectoryError::InvalidCredentials) => {
                tracing::info!(user = %username, "directory rejected principal credentials");
                return match self.config.security_mode {
                    SecurityMode::Normal => AuthOutcome::rejected(RejectReason::Deferred),
                    SecurityMode::Strict => {
                        AuthOutcome::rejected(RejectReason::InvalidCredentials)
                    }
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "directory unavailable during principal authentication");
                return AuthOutcome::rejected(RejectReason::DirectoryUnavailable);
            }
        };

        let local_user = match self.users.find_by_username(username).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(error = %e, user = %username, "local user lookup failed");
                return AuthOutcome::rejected(RejectReason::ProvisioningFailed);
            }
        };

        // Group membership is only fetched when the mode consults it.
        let is_group_member = if PolicyEngine::requires_group_check(&self.config) {
            match self.directory.list_groups(&token).await {
                Ok(groups) => {
                    let required = self.config.group.as_deref().unwrap_or_default();
                    Some(groups.iter().any(|g| g == required))
                }
                Err(e) => {
                    tracing::warn!(error = %e, user = %username, "group lookup failed");
                    return AuthOutcome::rejected(RejectReason::LookupFailed);
                }
            }
        } else {
            None
        };

        match PolicyEngine::decide(true, local_user.as_ref(), is_group_member, &self.config) {
            Decision::Accept(user_id) => {
                tracing::info!(user = %username, user_id = %user_id, "login accepted");
                AuthOutcome::accepted(user_id)
            }
            Decision::Reject(reason) => {
                tracing::info!(user = %username, reason = %reason, "login rejected");
                AuthOutcome::rejected(reason)
            }
            Decision::Provision => self.provision(username, &token).await,
        }
    }

    /// Create a local account from directory attributes. At most once per
    /// accepted login; a failed creation is surfaced, never retried.
    async fn provision(&self, username: &str, token: &PrincipalToken) -> AuthOutcome {
        let attributes = match self.directory.fetch_attributes(token).await {
            Ok(attributes) => attributes,
            Err(e) => {
                tracing::warn!(error = %e, user = %username, "attribute fetch failed");
                return AuthOutcome::rejected(RejectReason::LookupFailed);
            }
        };

        let profile = attributes.to_profile(username, &self.config.default_role);

        match self.users.create_user(&profile).await {
            Ok(user_id) => {
                tracing::info!(user = %username, user_id = %user_id, "local user provisioned");
                AuthOutcome::accepted(user_id)
            }
            Err(e) => {
                tracing::error!(error = %e, user = %username, "local user provisioning failed");
                AuthOutcome::rejected(RejectReason::ProvisioningFailed)
            }
        }
    }

    /// Verify the configured integration end to end with a test account:
    /// application authentication plus one principal check. Touches neither
    /// the user store nor the policy engine.
    pub async fn verify_settings(
        &self,
        username: &str,
        password: &str,
        ctx: &ClientContext,
    ) -> Result<(), DirectoryError> {
        self.directory.session().await?;
        self.directory
            .authenticate_principal(username, password, ctx)
            .await?;
        Ok(())
    }

    /// Check whether a principal token from an earlier attempt is still
    /// valid with the directory.
    pub async fn validate_session(
        &self,
        token: &PrincipalToken,
        ctx: &ClientContext,
    ) -> Result<bool, DirectoryError> {
        self.directory.validate_principal_token(token, ctx).await
    }

    /// Invalidate a principal token for all application clients, ending the
    /// user's directory session.
    pub async fn end_session(&self, token: &PrincipalToken) -> Result<(), DirectoryError> {
        self.directory.invalidate_principal_token(token).await
    }
}
