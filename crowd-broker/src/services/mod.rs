//! Services layer for the authentication broker.
//!
//! The transport talks to the directory server, the directory client owns
//! the application session, the policy engine makes the mode decision, and
//! the broker orchestrates one login attempt end to end.

mod broker;
mod directory;
pub mod error;
mod policy;
mod store;
mod transport;

pub use broker::AuthBroker;
pub use directory::DirectoryClient;
pub use error::DirectoryError;
pub use policy::{Decision, PolicyEngine};
pub use store::{UserStore, UserStoreError};
pub use transport::{DirectoryTransport, HttpTransport};
