//! Test helpers for broker integration tests.
//!
//! Provides a scriptable in-memory directory transport and user store so
//! the broker can be exercised without a directory server.

#![allow(dead_code)]

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use crowd_broker::config::{DirectoryConfig, LoginMode, SecurityMode};
use crowd_broker::dtos::{AppIdentity, Attribute, ValidationFactor};
use crowd_broker::models::{LocalUser, LocalUserId, UserProfile};
use crowd_broker::services::{DirectoryError, DirectoryTransport, UserStore, UserStoreError};

pub const APP_NAME: &str = "wordpress";
pub const APP_PASSWORD: &str = "app-secret";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,crowd_broker=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_config(login_mode: LoginMode, security_mode: SecurityMode) -> DirectoryConfig {
    DirectoryConfig {
        server_url: "https://crowd.example.com:8095/crowd".to_string(),
        application_name: APP_NAME.to_string(),
        application_password: Secret::new(APP_PASSWORD.to_string()),
        login_mode,
        security_mode,
        group: Some("staff".to_string()),
        default_role: "subscriber".to_string(),
        rpc_timeout_seconds: 5,
    }
}

/// A directory account known to the fake transport.
#[derive(Debug, Clone)]
pub struct FakePrincipal {
    pub password: String,
    pub attributes: Vec<(String, String)>,
    pub groups: Vec<String>,
}

/// Scriptable in-memory stand-in for the directory server.
#[derive(Default)]
pub struct FakeTransport {
    principals: Mutex<HashMap<String, FakePrincipal>>,
    /// Simulates the whole directory being unreachable.
    pub connection_down: AtomicBool,
    /// Simulates the directory rejecting the application credentials.
    pub reject_application: AtomicBool,
    /// Simulates a fault on the group lookup only.
    pub fail_group_lookup: AtomicBool,
    pub app_auth_calls: AtomicUsize,
    pub principal_auth_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub group_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_principal(
        &self,
        username: &str,
        password: &str,
        attributes: &[(&str, &str)],
        groups: &[&str],
    ) {
        self.principals.lock().unwrap().insert(
            username.to_string(),
            FakePrincipal {
                password: password.to_string(),
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                groups: groups.iter().map(|g| g.to_string()).collect(),
            },
        );
    }

    fn check_connection(&self) -> Result<(), DirectoryError> {
        if self.connection_down.load(Ordering::SeqCst) {
            Err(DirectoryError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn principal_for_token(&self, token: &str) -> Option<FakePrincipal> {
        let username = token.strip_prefix("principal-")?;
        self.principals.lock().unwrap().get(username).cloned()
    }
}

#[async_trait]
impl DirectoryTransport for FakeTransport {
    async fn authenticate_application(
        &self,
        name: &str,
        password: &Secret<String>,
    ) -> Result<String, DirectoryError> {
        self.app_auth_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;

        if self.reject_application.load(Ordering::SeqCst)
            || name != APP_NAME
            || password.expose_secret() != APP_PASSWORD
        {
            return Err(DirectoryError::Credential);
        }

        Ok("app-token".to_string())
    }

    async fn authenticate_principal(
        &self,
        _app: &AppIdentity,
        username: &str,
        password: &str,
        _factors: &[ValidationFactor],
    ) -> Result<String, DirectoryError> {
        self.principal_auth_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;

        let principals = self.principals.lock().unwrap();
        match principals.get(username) {
            Some(principal) if principal.password == password => {
                Ok(format!("principal-{}", username))
            }
            _ => Err(DirectoryError::InvalidCredentials),
        }
    }

    async fn find_principal_by_token(
        &self,
        _app: &AppIdentity,
        principal_token: &str,
    ) -> Result<Vec<Attribute>, DirectoryError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()
            .map_err(|_| DirectoryError::Lookup("connection refused".to_string()))?;

        let principal = self
            .principal_for_token(principal_token)
            .ok_or_else(|| DirectoryError::Lookup("unknown principal token".to_string()))?;

        Ok(principal
            .attributes
            .into_iter()
            .map(|(name, value)| Attribute {
                name,
                values: vec![value],
            })
            .collect())
    }

    async fn find_group_memberships(
        &self,
        _app: &AppIdentity,
        principal_token: &str,
    ) -> Result<Vec<String>, DirectoryError> {
        self.group_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_group_lookup.load(Ordering::SeqCst) {
            return Err(DirectoryError::Lookup("group lookup fault".to_string()));
        }
        self.check_connection()
            .map_err(|_| DirectoryError::Lookup("connection refused".to_string()))?;

        let principal = self
            .principal_for_token(principal_token)
            .ok_or_else(|| DirectoryError::Lookup("unknown principal token".to_string()))?;
        Ok(principal.groups)
    }

    async fn is_valid_principal_token(
        &self,
        _app: &AppIdentity,
        principal_token: &str,
        _factors: &[ValidationFactor],
    ) -> Result<bool, DirectoryError> {
        self.check_connection()?;
        Ok(self.principal_for_token(principal_token).is_some())
    }

    async fn invalidate_principal_token(
        &self,
        _app: &AppIdentity,
        _principal_token: &str,
    ) -> Result<(), DirectoryError> {
        self.check_connection()?;
        Ok(())
    }
}

/// In-memory user store with case-insensitive lookup, mirroring the host
/// application contract.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, LocalUser>>,
    next_id: AtomicI64,
    /// Simulates the store rejecting account creation.
    pub fail_create: AtomicBool,
    pub create_calls: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new(first_id: i64) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(first_id),
            fail_create: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, id: i64, username: &str) {
        self.users.lock().unwrap().insert(
            username.to_lowercase(),
            LocalUser::new(id, username),
        );
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users
            .lock()
            .unwrap()
            .contains_key(&username.to_lowercase())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<LocalUser>, UserStoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&username.to_lowercase())
            .cloned())
    }

    async fn create_user(&self, profile: &UserProfile) -> Result<LocalUserId, UserStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(UserStoreError::Create("store offline".to_string()));
        }

        let mut users = self.users.lock().unwrap();
        let key = profile.username.to_lowercase();
        if users.contains_key(&key) {
            return Err(UserStoreError::Duplicate(profile.username.clone()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        users.insert(key, LocalUser::new(id, &profile.username));
        Ok(LocalUserId(id))
    }
}
