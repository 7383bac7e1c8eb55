//! Axum integration for authflux: the OAuth callback endpoint that finishes
//! a browser redirect flow by exchanging the one-time code for a session.

#![warn(missing_docs)]

use std::sync::Arc;

use authflux_core::AuthClient;
use axum::extract::{FromRef, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use log::warn;
use serde::Deserialize;

/// Where the callback sends the browser afterwards.
#[derive(Clone, Debug)]
pub struct CallbackConfig {
    /// Login page to land on when the callback fails or carries no code.
    pub login_path: String,
    /// Destination after a successful exchange when `next` is absent.
    pub default_next: String,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            default_next: "/".to_string(),
        }
    }
}

/// Application state wiring the provider client into the callback handler.
#[derive(Clone)]
pub struct AuthfluxState {
    /// The injected provider client.
    pub client: Arc<dyn AuthClient>,
    /// Redirect targets for the callback.
    pub callback: CallbackConfig,
}

impl FromRef<AuthfluxState> for Arc<dyn AuthClient> {
    fn from_ref(state: &AuthfluxState) -> Self {
        state.client.clone()
    }
}

impl FromRef<AuthfluxState> for CallbackConfig {
    fn from_ref(state: &AuthfluxState) -> Self {
        state.callback.clone()
    }
}

/// Query parameters of `GET /auth/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Short-lived one-time code to exchange for a session.
    pub code: Option<String>,
    /// Where to go after a successful exchange.
    pub next: Option<String>,
}

/// Handle the OAuth return leg.
///
/// - no `code` parameter: back to the login page, no error parameter;
/// - exchange failure: back to the login page with `?error=<message>`;
/// - success: redirect to `next` (default `/`).
pub async fn axum_callback_handler<S>(
    State(state): State<S>,
    Query(params): Query<CallbackParams>,
) -> Redirect
where
    S: Send + Sync,
    Arc<dyn AuthClient>: FromRef<S>,
    CallbackConfig: FromRef<S>,
{
    let client = Arc::<dyn AuthClient>::from_ref(&state);
    let config = CallbackConfig::from_ref(&state);

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return Redirect::to(&config.login_path);
    };

    match client.exchange_code(&code).await {
        Ok(_session) => {
            // Only same-site relative targets; anything else falls back to
            // the default to keep the callback from becoming an open
            // redirect.
            let next = params
                .next
                .as_deref()
                .filter(|n| n.starts_with('/') && !n.starts_with("//"))
                .unwrap_or(&config.default_next);
            Redirect::to(next)
        }
        Err(e) => {
            warn!("auth callback code exchange failed: {e}");
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("error", &e.message())
                .finish();
            Redirect::to(&format!("{}?{}", config.login_path, query))
        }
    }
}

/// Router mounting the callback endpoint at `/auth/callback`.
pub fn callback_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<dyn AuthClient>: FromRef<S>,
    CallbackConfig: FromRef<S>,
{
    Router::new().route("/auth/callback", get(axum_callback_handler::<S>))
}
