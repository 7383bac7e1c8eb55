use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity record issued by the provider.
///
/// Never mutated locally; replaced wholesale on each auth event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned user id.
    pub id: String,
    /// Primary email address, if the provider reports one.
    #[serde(default)]
    pub email: Option<String>,
    /// Provider-defined fields with no first-class representation here.
    #[serde(default, flatten)]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Credential bundle issued by the provider, proving an authenticated
/// identity. The token is opaque; expiry and refresh are the provider's
/// concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer credential.
    pub access_token: String,
    /// Token type, `bearer` in practice.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
    /// The authenticated identity.
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Snapshot of the reactive authentication state.
///
/// Invariants: `loading` is true only during an in-flight action or the
/// initial hydration; `error` is cleared at the start of every action and on
/// every provider event.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    /// The authenticated identity, absent when signed out.
    pub user: Option<User>,
    /// The current session, absent when signed out.
    pub session: Option<Session>,
    /// Whether an action or the initial hydration is in flight.
    pub loading: bool,
    /// The most recent provider-reported error message.
    pub error: Option<String>,
}

impl AuthState {
    /// State at the start of hydration: nothing known yet, loading.
    pub fn hydrating() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Whether a session is currently established.
    pub fn signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Replace the session and user atomically, clearing any stale error.
    pub fn apply_session(&mut self, session: Option<Session>) {
        self.user = session.as_ref().map(|s| s.user.clone());
        self.session = session;
        self.loading = false;
        self.error = None;
    }
}
