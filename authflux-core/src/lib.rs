//! # Authflux Core
//!
//! `authflux-core` provides the foundational traits and types for the Authflux
//! client-side authentication toolkit. It defines the capability trait for a
//! hosted identity provider's client, the reactive auth state types shared by
//! the rest of the ecosystem, and the pre-submission form validation rules.

#![warn(missing_docs)]

use async_trait::async_trait;
use tokio::sync::broadcast;
use url::Url;

/// Errors that can occur during the authentication process.
pub mod error;
use crate::error::AuthError;

/// Reactive authentication state and identity types.
pub mod state;
use crate::state::Session;

/// Client-side form validation and the per-form submission state machine.
pub mod form;

pub use form::{FormPhase, LoginForm, SignupForm, ValidationErrors};
pub use state::{AuthState, User};

/// A change pushed on the provider's live auth event stream.
#[derive(Clone, Debug)]
pub enum AuthEvent {
    /// A session was established (password login or code exchange).
    SignedIn(Session),
    /// The session was terminated.
    SignedOut,
    /// The provider refreshed the access token for the current session.
    TokenRefreshed(Session),
}

/// Capability trait for a hosted identity provider's client SDK.
///
/// Consumers receive an instance explicitly (dependency injection) rather
/// than reaching for a process-wide singleton, so tests can substitute a
/// stub client.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Return the current session, if one is cached by the client.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Register a new account. The provider sends a verification message
    /// out-of-band; no session exists until the link is followed.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Authenticate with email and password, establishing a session.
    ///
    /// On success, implementations must broadcast
    /// [`AuthEvent::SignedIn`] with the new session: stores track the
    /// session through the event stream, not the return value.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    /// Build the authorization URL for a browser redirect through the named
    /// OAuth provider. The return leg lands on the callback endpoint.
    fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AuthError>;

    /// Exchange a one-time authorization code for a session.
    ///
    /// On success, implementations must broadcast
    /// [`AuthEvent::SignedIn`] with the new session, as for
    /// [`AuthClient::sign_in_with_password`].
    async fn exchange_code(&self, code: &str) -> Result<Session, AuthError>;

    /// Terminate the current session. The provider invalidates the token
    /// server-side; the client drops its cached session and broadcasts
    /// [`AuthEvent::SignedOut`] regardless of the server outcome.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to the provider's live auth event stream.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

#[async_trait]
impl<T: AuthClient + ?Sized> AuthClient for std::sync::Arc<T> {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        (**self).get_session().await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        (**self).sign_up(email, password).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        (**self).sign_in_with_password(email, password).await
    }

    fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AuthError> {
        (**self).sign_in_with_oauth(provider)
    }

    async fn exchange_code(&self, code: &str) -> Result<Session, AuthError> {
        (**self).exchange_code(code).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        (**self).sign_out().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        (**self).subscribe()
    }
}
