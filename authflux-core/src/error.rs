use thiserror::Error;

use crate::form::ValidationErrors;

/// Errors that can occur during the authentication process.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Client-side validation failure. Blocks submission; never reaches the
    /// provider.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// An error reported by the identity provider, surfaced verbatim to the
    /// caller.
    #[error("{0}")]
    Provider(String),

    /// A transport-level failure talking to the provider or backend.
    #[error("network error: {0}")]
    Network(String),
}

impl AuthError {
    /// The message to expose in `AuthState.error`.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
