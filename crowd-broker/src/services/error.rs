use thiserror::Error;

/// Faults reported by the directory, already classified at the transport
/// boundary. Raw transport errors never propagate past the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The directory endpoint could not be reached or did not answer within
    /// the RPC timeout. Recoverable by retrying a later attempt, never
    /// within the same one.
    #[error("directory connection error: {0}")]
    Connection(String),

    /// The directory explicitly rejected the application name/password.
    /// A configuration problem; not user-fixable.
    #[error("application credentials rejected by directory")]
    Credential,

    /// The directory rejected the principal's username/password.
    #[error("principal credentials rejected by directory")]
    InvalidCredentials,

    /// An attribute or group fetch failed after a valid principal token.
    /// A hard failure, never to be treated as an empty result.
    #[error("directory lookup failed: {0}")]
    Lookup(String),
}

impl DirectoryError {
    /// True when the cached application session may be stale and must be
    /// re-established before the next attempt.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, DirectoryError::Connection(_) | DirectoryError::Credential)
    }
}
