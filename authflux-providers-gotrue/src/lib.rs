//! # Authflux GoTrue Provider
//!
//! An [`AuthClient`] implementation speaking the REST dialect of a
//! GoTrue-compatible hosted identity service. The client holds the cached
//! current session and fans provider events out over an in-process broadcast
//! channel; token storage and refresh stay the hosted service's concern.

#![warn(missing_docs)]

use async_trait::async_trait;
use authflux_core::error::AuthError;
use authflux_core::state::{Session, User};
use authflux_core::{AuthClient, AuthEvent};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use url::Url;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Connection settings for a hosted GoTrue-compatible endpoint.
#[derive(Clone, Debug)]
pub struct GotrueConfig {
    /// Base URL of the auth endpoint, e.g. `https://abc.example.co/auth/v1/`.
    pub project_url: Url,
    /// The project's public API key, sent as the `apikey` header.
    pub api_key: String,
    /// Where the provider redirects after email verification or OAuth,
    /// e.g. `https://app.example.com/auth/callback`.
    pub redirect_to: Url,
}

impl GotrueConfig {
    /// Read the configuration from `AUTHFLUX_PROJECT_URL`,
    /// `AUTHFLUX_API_KEY` and `AUTHFLUX_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, AuthError> {
        let project_url = require_env("AUTHFLUX_PROJECT_URL")?;
        let api_key = require_env("AUTHFLUX_API_KEY")?;
        let redirect_to = require_env("AUTHFLUX_REDIRECT_URI")?;
        Ok(Self {
            project_url: parse_url("AUTHFLUX_PROJECT_URL", &project_url)?,
            api_key,
            redirect_to: parse_url("AUTHFLUX_REDIRECT_URI", &redirect_to)?,
        })
    }
}

fn require_env(name: &str) -> Result<String, AuthError> {
    std::env::var(name).map_err(|_| AuthError::Provider(format!("{name} is not set")))
}

fn parse_url(name: &str, value: &str) -> Result<Url, AuthError> {
    Url::parse(value).map_err(|e| AuthError::Provider(format!("{name} is not a valid URL: {e}")))
}

/// Client for a GoTrue-compatible hosted identity provider.
///
/// Construct one instance and pass it to consumers explicitly; there is no
/// process-wide singleton.
pub struct GotrueClient {
    http: reqwest::Client,
    config: GotrueConfig,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

/// Session payload returned by the token endpoints.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            token_type: self.token_type,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            user: self.user,
        }
    }
}

/// Error body shapes seen across GoTrue versions.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl GotrueClient {
    /// Create a new client for the given endpoint.
    pub fn new(mut config: GotrueConfig) -> Self {
        // `Url::join` treats a path without a trailing slash as a file and
        // would drop its last segment.
        if !config.project_url.path().ends_with('/') {
            let path = format!("{}/", config.project_url.path());
            config.project_url.set_path(&path);
        }
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http: reqwest::Client::new(),
            config,
            current: RwLock::new(None),
            events,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.config
            .project_url
            .join(path)
            .map_err(|e| AuthError::Provider(format!("invalid endpoint path {path}: {e}")))
    }

    fn emit(&self, event: AuthEvent) {
        // Nobody listening yet is fine; the store subscribes before acting.
        let _ = self.events.send(event);
    }

    async fn store_session(&self, session: Session) {
        log::debug!("session established for user {}", session.user.id);
        *self.current.write().await = Some(session.clone());
        self.emit(AuthEvent::SignedIn(session));
    }

    async fn read_error(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .error_description
            .or(body.msg)
            .or(body.message)
            .unwrap_or_else(|| format!("provider returned status {status}"));
        AuthError::Provider(message)
    }

    async fn token_request(&self, grant_type: &str, payload: serde_json::Value)
        -> Result<Session, AuthError>
    {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let session = token.into_session();
        self.store_session(session.clone()).await;
        Ok(session)
    }
}

#[async_trait]
impl AuthClient for GotrueClient {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.current.read().await.clone())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let mut url = self.endpoint("signup")?;
        url.query_pairs_mut()
            .append_pair("redirect_to", self.config.redirect_to.as_str());

        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        // The provider sends the verification email; no session until the
        // link is followed.
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.token_request(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AuthError> {
        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", self.config.redirect_to.as_str());
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Session, AuthError> {
        self.token_request(
            "authorization_code",
            serde_json::json!({ "auth_code": code }),
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Drop local state first: the session must not survive a failed
        // revocation call.
        let previous = self.current.write().await.take();
        self.emit(AuthEvent::SignedOut);

        let Some(session) = previous else {
            return Ok(());
        };

        let url = self.endpoint("logout")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
