//! # Authflux
//!
//! A modular client-side authentication toolkit for hosted identity
//! providers: a reactive session store, thin auth actions, a best-effort
//! backend bootstrap, and an axum callback endpoint for OAuth return legs.
//!
//! Each concern lives in its own crate and is re-exported here behind a
//! feature flag:
//!
//! - `session`: [`SessionManager`], [`Bootstrap`], [`ContextBootstrapper`]
//! - `gotrue`: [`GotrueClient`], [`GotrueConfig`]
//! - `axum`: [`callback_router`], [`AuthfluxState`]

#![warn(missing_docs)]

pub use authflux_core::error::AuthError;
pub use authflux_core::state::Session;
pub use authflux_core::{
    AuthClient, AuthEvent, AuthState, FormPhase, LoginForm, SignupForm, User, ValidationErrors,
};

#[cfg(feature = "session")]
pub use authflux_session::{Bootstrap, ContextBootstrapper, SessionManager};

#[cfg(feature = "gotrue")]
pub use authflux_providers_gotrue::{GotrueClient, GotrueConfig};

#[cfg(feature = "axum")]
pub use authflux_axum::{callback_router, AuthfluxState, CallbackConfig, CallbackParams};
