use secrecy::Secret;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating the broker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Connection and policy settings for one directory integration.
///
/// Immutable for the duration of an authentication attempt. Load once with
/// [`DirectoryConfig::from_env`] or build directly from the host's own
/// settings storage, then pass by value into the broker.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL of the directory server, e.g. `https://crowd.example.com:8095/crowd`.
    pub server_url: String,
    /// Application name registered in the directory backend.
    pub application_name: String,
    /// Application password registered in the directory backend.
    pub application_password: Secret<String>,
    pub login_mode: LoginMode,
    pub security_mode: SecurityMode,
    /// Directory group a user must belong to. Required (and only consulted)
    /// when `login_mode` is [`LoginMode::CreateGroup`].
    pub group: Option<String>,
    /// Role assigned to locally provisioned accounts.
    pub default_role: String,
    /// Per-RPC timeout towards the directory server.
    pub rpc_timeout_seconds: u64,
}

/// Controls whether a local account is auto-provisioned after a successful
/// directory authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    /// Authenticate only; never create a local account.
    Auth,
    /// Create a local account for any principal the directory accepts.
    Create,
    /// Create a local account only for members of the configured group.
    CreateGroup,
}

/// Controls whether a rejected directory check may defer to an alternative
/// (local) authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    /// An unrecognized principal defers to the host's fallback path.
    Normal,
    /// The broker's decision is final; no fallback may run.
    Strict,
}

impl DirectoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = DirectoryConfig {
            server_url: get_env("CROWD_URL", None)?,
            application_name: get_env("CROWD_APPLICATION_NAME", None)?,
            application_password: Secret::new(get_env("CROWD_APPLICATION_PASSWORD", None)?),
            login_mode: get_env("CROWD_LOGIN_MODE", Some("auth"))?
                .parse()
                .map_err(|reason| ConfigError::Invalid {
                    key: "CROWD_LOGIN_MODE".to_string(),
                    reason,
                })?,
            security_mode: get_env("CROWD_SECURITY_MODE", Some("normal"))?
                .parse()
                .map_err(|reason| ConfigError::Invalid {
                    key: "CROWD_SECURITY_MODE".to_string(),
                    reason,
                })?,
            group: env::var("CROWD_GROUP").ok().filter(|g| !g.is_empty()),
            default_role: get_env("CROWD_DEFAULT_ROLE", Some("subscriber"))?,
            rpc_timeout_seconds: get_env("CROWD_RPC_TIMEOUT_SECONDS", Some("5"))?
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    key: "CROWD_RPC_TIMEOUT_SECONDS".to_string(),
                    reason: e.to_string(),
                })?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.server_url).map_err(|e| ConfigError::Invalid {
            key: "server_url".to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid {
                key: "server_url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.application_name.trim().is_empty() {
            return Err(ConfigError::Missing("application_name".to_string()));
        }

        // The group gate is meaningless without a group to check.
        if self.login_mode == LoginMode::CreateGroup
            && self.group.as_deref().map_or(true, |g| g.trim().is_empty())
        {
            return Err(ConfigError::Invalid {
                key: "group".to_string(),
                reason: "a group is required when login_mode is create_group".to_string(),
            });
        }

        if self.rpc_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "rpc_timeout_seconds".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(ConfigError::Missing(key.to_string()))
            }
        }
    }
}

impl std::str::FromStr for LoginMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auth" => Ok(LoginMode::Auth),
            "create" => Ok(LoginMode::Create),
            "create_group" => Ok(LoginMode::CreateGroup),
            _ => Err(format!("invalid login mode: {}", s)),
        }
    }
}

impl std::str::FromStr for SecurityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(SecurityMode::Normal),
            "strict" => Ok(SecurityMode::Strict),
            _ => Err(format!("invalid security mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> DirectoryConfig {
        DirectoryConfig {
            server_url: "https://crowd.example.com:8095/crowd".to_string(),
            application_name: "wordpress".to_string(),
            application_password: Secret::new("app-secret".to_string()),
            login_mode: LoginMode::Auth,
            security_mode: SecurityMode::Normal,
            group: None,
            default_role: "subscriber".to_string(),
            rpc_timeout_seconds: 5,
        }
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("auth".parse::<LoginMode>().unwrap(), LoginMode::Auth);
        assert_eq!("create".parse::<LoginMode>().unwrap(), LoginMode::Create);
        assert_eq!(
            "CREATE_GROUP".parse::<LoginMode>().unwrap(),
            LoginMode::CreateGroup
        );
        assert!("mode_auth".parse::<LoginMode>().is_err());

        assert_eq!(
            "normal".parse::<SecurityMode>().unwrap(),
            SecurityMode::Normal
        );
        assert_eq!(
            "strict".parse::<SecurityMode>().unwrap(),
            SecurityMode::Strict
        );
        assert!("paranoid".parse::<SecurityMode>().is_err());
    }

    #[test]
    fn test_valid_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_group_required_for_group_mode() {
        let mut config = base_config();
        config.login_mode = LoginMode::CreateGroup;
        assert!(config.validate().is_err());

        config.group = Some("  ".to_string());
        assert!(config.validate().is_err());

        config.group = Some("staff".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = base_config();
        config.server_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.server_url = "ftp://crowd.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = base_config();
        config.rpc_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
