pub mod outcome;
pub mod principal;
pub mod user;

pub use outcome::{AuthOutcome, RejectReason};
pub use principal::{ApplicationSession, ClientContext, PrincipalAttributes, PrincipalToken};
pub use user::{LocalUser, LocalUserId, UserProfile};
