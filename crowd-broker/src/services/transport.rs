//! RPC transport towards the directory security server.
//!
//! [`DirectoryTransport`] is the seam the rest of the crate programs
//! against; [`HttpTransport`] is the bundled JSON-over-HTTP binding. Every
//! transport fault is converted to a [`DirectoryError`] here — callers never
//! see a raw `reqwest` error.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};

use crate::config::DirectoryConfig;
use crate::dtos::{
    AppAuthRequest, AppIdentity, Attribute, GroupsResponse, PasswordCredential,
    PrincipalAuthRequest, PrincipalTokenRequest, TokenResponse, ValidResponse,
    ValidateTokenRequest, ValidationFactor,
};
use crate::services::error::DirectoryError;

/// The directory's security-server operations, one method per remote call.
///
/// All operations are free of local side effects and safe to retry, except
/// `authenticate_principal`: once the directory reported invalid
/// credentials, implementations and callers must not retry it.
#[async_trait]
pub trait DirectoryTransport: Send + Sync {
    async fn authenticate_application(
        &self,
        name: &str,
        password: &Secret<String>,
    ) -> Result<String, DirectoryError>;

    async fn authenticate_principal(
        &self,
        app: &AppIdentity,
        username: &str,
        password: &str,
        factors: &[ValidationFactor],
    ) -> Result<String, DirectoryError>;

    async fn find_principal_by_token(
        &self,
        app: &AppIdentity,
        principal_token: &str,
    ) -> Result<Vec<Attribute>, DirectoryError>;

    async fn find_group_memberships(
        &self,
        app: &AppIdentity,
        principal_token: &str,
    ) -> Result<Vec<String>, DirectoryError>;

    async fn is_valid_principal_token(
        &self,
        app: &AppIdentity,
        principal_token: &str,
        factors: &[ValidationFactor],
    ) -> Result<bool, DirectoryError>;

    async fn invalidate_principal_token(
        &self,
        app: &AppIdentity,
        principal_token: &str,
    ) -> Result<(), DirectoryError>;
}

/// JSON-over-HTTP binding of the security-server contract.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from the directory configuration. The configured
    /// RPC timeout applies to every call, connection setup included.
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.rpc_timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/services/{}", self.base_url, endpoint)
    }
}

fn connection_error(err: reqwest::Error) -> DirectoryError {
    if err.is_timeout() {
        DirectoryError::Connection("request timed out".to_string())
    } else {
        DirectoryError::Connection(err.to_string())
    }
}

fn lookup_error(err: reqwest::Error) -> DirectoryError {
    DirectoryError::Lookup(err.to_string())
}

#[async_trait]
impl DirectoryTransport for HttpTransport {
    async fn authenticate_application(
        &self,
        name: &str,
        password: &Secret<String>,
    ) -> Result<String, DirectoryError> {
        let request = AppAuthRequest {
            name: name.to_string(),
            credential: PasswordCredential::new(password.expose_secret().clone()),
        };

        let response = self
            .client
            .post(self.url("application/authenticate"))
            .json(&request)
            .send()
            .await
            .map_err(connection_error)?;

        match response.status() {
            status if status.is_success() => {
                let body: TokenResponse = response.json().await.map_err(connection_error)?;
                // The SOAP server answered success faults with an empty
                // token; treat that as rejected credentials as well.
                if body.token.is_empty() {
                    return Err(DirectoryError::Credential);
                }
                Ok(body.token)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DirectoryError::Credential),
            status => Err(DirectoryError::Connection(format!(
                "unexpected status {} from application authentication",
                status
            ))),
        }
    }

    async fn authenticate_principal(
        &self,
        app: &AppIdentity,
        username: &str,
        password: &str,
        factors: &[ValidationFactor],
    ) -> Result<String, DirectoryError> {
        let request = PrincipalAuthRequest {
            application: app.clone(),
            name: username.to_string(),
            credential: PasswordCredential::new(password),
            validation_factors: factors.to_vec(),
        };

        let response = self
            .client
            .post(self.url("principal/authenticate"))
            .json(&request)
            .send()
            .await
            .map_err(connection_error)?;

        match response.status() {
            status if status.is_success() => {
                let body: TokenResponse = response.json().await.map_err(connection_error)?;
                Ok(body.token)
            }
            status if status.is_client_error() => Err(DirectoryError::InvalidCredentials),
            status => Err(DirectoryError::Connection(format!(
                "unexpected status {} from principal authentication",
                status
            ))),
        }
    }

    async fn find_principal_by_token(
        &self,
        app: &AppIdentity,
        principal_token: &str,
    ) -> Result<Vec<Attribute>, DirectoryError> {
        let request = PrincipalTokenRequest {
            application: app.clone(),
            token: principal_token.to_string(),
        };

        let response = self
            .client
            .post(self.url("principal/find"))
            .json(&request)
            .send()
            .await
            .map_err(lookup_error)?;

        if !response.status().is_success() {
            return Err(DirectoryError::Lookup(format!(
                "attribute fetch returned status {}",
                response.status()
            )));
        }

        #[derive(serde::Deserialize)]
        struct PrincipalResponse {
            #[serde(default)]
            attributes: Vec<Attribute>,
        }

        let body: PrincipalResponse = response.json().await.map_err(lookup_error)?;
        Ok(body.attributes)
    }

    async fn find_group_memberships(
        &self,
        app: &AppIdentity,
        principal_token: &str,
    ) -> Result<Vec<String>, DirectoryError> {
        let request = PrincipalTokenRequest {
            application: app.clone(),
            token: principal_token.to_string(),
        };

        let response = self
            .client
            .post(self.url("principal/groups"))
            .json(&request)
            .send()
            .await
            .map_err(lookup_error)?;

        if !response.status().is_success() {
            return Err(DirectoryError::Lookup(format!(
                "group lookup returned status {}",
                response.status()
            )));
        }

        let body: GroupsResponse = response.json().await.map_err(lookup_error)?;
        Ok(body.into_groups())
    }

    async fn is_valid_principal_token(
        &self,
        app: &AppIdentity,
        principal_token: &str,
        factors: &[ValidationFactor],
    ) -> Result<bool, DirectoryError> {
        let request = ValidateTokenRequest {
            application: app.clone(),
            token: principal_token.to_string(),
            validation_factors: factors.to_vec(),
        };

        let response = self
            .client
            .post(self.url("principal/validate"))
            .json(&request)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(DirectoryError::Lookup(format!(
                "token validation returned status {}",
                response.status()
            )));
        }

        let body: ValidResponse = response.json().await.map_err(connection_error)?;
        Ok(body.valid)
    }

    async fn invalidate_principal_token(
        &self,
        app: &AppIdentity,
        principal_token: &str,
    ) -> Result<(), DirectoryError> {
        let request = PrincipalTokenRequest {
            application: app.clone(),
            token: principal_token.to_string(),
        };

        let response = self
            .client
            .post(self.url("principal/invalidate"))
            .json(&request)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(DirectoryError::Lookup(format!(
                "token invalidation returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
