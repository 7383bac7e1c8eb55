use async_trait::async_trait;
use authflux_core::state::Session;
use log::{debug, warn};
use serde::Deserialize;
use url::Url;

/// One-shot backend call ensuring a user-context record exists for a newly
/// established session.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    /// Best-effort: implementations log failures and return normally. The
    /// result never surfaces to the caller and never blocks sign-in.
    async fn ensure_user_context(&self, session: &Session);
}

#[derive(Debug, Deserialize)]
struct ContextResponse {
    created: bool,
}

/// Bootstrapper targeting `POST {base}/users/context` with the session's
/// access token as a bearer credential.
///
/// Not retried and not deduplicated across rapid sign-in transitions; the
/// endpoint is create-if-absent, so duplicates are harmless.
pub struct ContextBootstrapper {
    http: reqwest::Client,
    base_url: Url,
}

impl ContextBootstrapper {
    /// Create a bootstrapper for the given backend base URL.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    async fn post_context(&self, session: &Session) -> Result<bool, String> {
        let url = self
            .base_url
            .join("users/context")
            .map_err(|e| e.to_string())?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("backend returned status {}", response.status()));
        }
        let body: ContextResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.created)
    }
}

#[async_trait]
impl Bootstrap for ContextBootstrapper {
    async fn ensure_user_context(&self, session: &Session) {
        match self.post_context(session).await {
            Ok(created) => debug!(
                "user context {} for user {}",
                if created { "created" } else { "retrieved" },
                session.user.id
            ),
            Err(e) => warn!(
                "user context bootstrap failed for user {}: {e}",
                session.user.id
            ),
        }
    }
}
