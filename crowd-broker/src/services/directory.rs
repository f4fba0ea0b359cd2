//! Directory client adapter.
//!
//! Owns the application session and performs the principal-level RPCs on
//! top of a [`DirectoryTransport`]. The session token never leaves this
//! module.

use secrecy::Secret;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::DirectoryConfig;
use crate::dtos::{AppIdentity, ValidationFactor};
use crate::models::{ApplicationSession, ClientContext, PrincipalAttributes, PrincipalToken};
use crate::services::error::DirectoryError;
use crate::services::transport::DirectoryTransport;

/// Client for principal operations against the directory, holding the
/// application's own session.
///
/// The session is established lazily on first use and shared by concurrent
/// attempts; it is dropped eagerly whenever the directory reports a
/// connection or application-credential fault so the next attempt
/// re-authenticates instead of retrying a known-bad token.
#[derive(Clone)]
pub struct DirectoryClient {
    transport: Arc<dyn DirectoryTransport>,
    application_name: String,
    application_password: Secret<String>,
    session: Arc<RwLock<Option<ApplicationSession>>>,
}

impl DirectoryClient {
    pub fn new(config: &DirectoryConfig, transport: Arc<dyn DirectoryTransport>) -> Self {
        Self {
            transport,
            application_name: config.application_name.clone(),
            application_password: config.application_password.clone(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the current application session, authenticating the application
    /// if none is cached.
    pub async fn session(&self) -> Result<ApplicationSession, DirectoryError> {
        // Fast path: reuse a session another attempt already established.
        {
            let guard = self.session.read().await;
            if let Some(session) = guard.as_ref() {
                tracing::debug!(age_secs = session.age().num_seconds(), "reusing application session");
                return Ok(session.clone());
            }
        }

        let mut guard = self.session.write().await;

        // Double-check in case another task authenticated while we waited.
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }

        let token = self
            .transport
            .authenticate_application(&self.application_name, &self.application_password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "application authentication failed");
                e
            })?;

        let session = ApplicationSession::new(token);
        tracing::info!(application = %self.application_name, "application session established");
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Drop the cached application session, forcing re-authentication on
    /// the next call.
    pub async fn invalidate_session(&self) {
        let mut guard = self.session.write().await;
        if guard.take().is_some() {
            tracing::info!("application session invalidated");
        }
    }

    async fn app_identity(&self) -> Result<AppIdentity, DirectoryError> {
        let session = self.session().await?;
        Ok(AppIdentity {
            name: self.application_name.clone(),
            token: session.token,
        })
    }

    /// Discard the session when the fault means its token may be stale.
    async fn note_failure(&self, err: &DirectoryError) {
        if err.invalidates_session() {
            self.invalidate_session().await;
        }
    }

    /// Verify a principal's credentials, forwarding the request context as
    /// validation factors. Not retried after the directory reported invalid
    /// credentials; connection faults surface to the caller and invalidate
    /// the cached session for the next attempt.
    pub async fn authenticate_principal(
        &self,
        username: &str,
        password: &str,
        ctx: &ClientContext,
    ) -> Result<PrincipalToken, DirectoryError> {
        let app = self.app_identity().await?;
        let factors = ValidationFactor::from_context(ctx);

        match self
            .transport
            .authenticate_principal(&app, username, password, &factors)
            .await
        {
            Ok(token) => Ok(PrincipalToken::new(token)),
            Err(e) => {
                self.note_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Fetch the principal's profile attributes. Idempotent and read-only.
    pub async fn fetch_attributes(
        &self,
        token: &PrincipalToken,
    ) -> Result<PrincipalAttributes, DirectoryError> {
        let app = self.app_identity().await?;

        let attributes = self
            .transport
            .find_principal_by_token(&app, token.as_str())
            .await?;

        let map: HashMap<String, Vec<String>> = attributes
            .into_iter()
            .map(|attr| (attr.name, attr.values))
            .collect();
        Ok(PrincipalAttributes::new(map))
    }

    /// List the principal's group memberships. An empty list is a valid
    /// result, distinct from a lookup failure.
    pub async fn list_groups(
        &self,
        token: &PrincipalToken,
    ) -> Result<Vec<String>, DirectoryError> {
        let app = self.app_identity().await?;
        self.transport
            .find_group_memberships(&app, token.as_str())
            .await
    }

    /// Check whether a previously issued principal token is still valid.
    pub async fn validate_principal_token(
        &self,
        token: &PrincipalToken,
        ctx: &ClientContext,
    ) -> Result<bool, DirectoryError> {
        let app = self.app_identity().await?;
        let factors = ValidationFactor::from_context(ctx);

        match self
            .transport
            .is_valid_principal_token(&app, token.as_str(), &factors)
            .await
        {
            Ok(valid) => Ok(valid),
            Err(e) => {
                self.note_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Invalidate a principal token for all application clients.
    pub async fn invalidate_principal_token(
        &self,
        token: &PrincipalToken,
    ) -> Result<(), DirectoryError> {
        let app = self.app_identity().await?;

        match self
            .transport
            .invalidate_principal_token(&app, token.as_str())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                self.note_failure(&e).await;
                Err(e)
            }
        }
    }
}
