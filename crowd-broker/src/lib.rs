//! Directory-backed authentication broker for Crowd-style SSO servers.
//!
//! The broker turns a raw `(username, password)` pair into an
//! [`AuthOutcome`](models::AuthOutcome): accept an existing local user,
//! provision and accept a new one, or reject with a typed reason. The remote
//! directory is reached through the [`DirectoryTransport`](services::DirectoryTransport)
//! seam, so hosts can plug in the bundled HTTP binding or their own.
//!
//! The crate never persists passwords and never renders user-facing
//! messages; translating [`RejectReason`](models::RejectReason) values into
//! host conventions is the caller's job.

pub mod config;
pub mod dtos;
pub mod models;
pub mod services;

pub use config::{DirectoryConfig, LoginMode, SecurityMode};
pub use models::{
    AuthOutcome, ClientContext, LocalUser, LocalUserId, PrincipalToken, RejectReason, UserProfile,
};
pub use services::{
    AuthBroker, DirectoryClient, DirectoryError, DirectoryTransport, HttpTransport, PolicyEngine,
    UserStore, UserStoreError,
};
