//! # Authflux Session
//!
//! `authflux-session` keeps a reactive [`AuthState`] synchronized with a
//! hosted identity provider. The [`SessionManager`] hydrates the initial
//! session, follows the provider's live event stream, exposes the auth
//! actions (sign-up, password and OAuth sign-in, sign-out), and fires the
//! best-effort backend bootstrap whenever a session is newly established.
//!
//! ## Key Components
//!
//! - **[`SessionManager`]**: the session store. Single writer to the state
//!   channel; consumers subscribe through a `tokio::sync::watch` receiver.
//! - **[`Bootstrap`] / [`ContextBootstrapper`]**: fire-and-forget
//!   user-context creation against the backend.

#![warn(missing_docs)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use authflux_core::error::AuthError;
use authflux_core::state::{AuthState, Session};
use authflux_core::{AuthClient, AuthEvent, LoginForm, SignupForm};
use log::{debug, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use url::Url;

/// Fire-and-forget backend bootstrap.
pub mod bootstrap;

pub use bootstrap::{Bootstrap, ContextBootstrapper};

/// The reactive session store.
///
/// Owns the only writer to the auth state channel. State writes carry a
/// monotonically increasing sequence number so that a slow initial hydration
/// resolving after a live auth event cannot overwrite the newer state.
///
/// Dropping the manager aborts the hydration and event tasks, which drops
/// the provider subscription deterministically.
pub struct SessionManager {
    inner: Arc<Inner>,
    hydrate_task: JoinHandle<()>,
    event_task: JoinHandle<()>,
}

struct Inner {
    client: Arc<dyn AuthClient>,
    bootstrap: Option<Arc<dyn Bootstrap>>,
    state: watch::Sender<AuthState>,
    seq: AtomicU64,
    last_applied: Mutex<u64>,
}

impl Inner {
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Apply a state mutation if `seq` is newer than anything applied so
    /// far. Returns whether the write went through.
    fn apply(&self, seq: u64, mutate: impl FnOnce(&mut AuthState)) -> bool {
        let mut last = self.last_applied.lock().unwrap_or_else(|e| e.into_inner());
        if seq <= *last {
            debug!("discarding out-of-order state update (seq {seq} <= {last})");
            return false;
        }
        *last = seq;
        self.state.send_modify(mutate);
        true
    }

    /// Replace the session atomically and, on an absent-to-present
    /// transition, fire the bootstrapper exactly once.
    fn apply_session(&self, seq: u64, session: Option<Session>) {
        let newly_signed_in = {
            let mut last = self.last_applied.lock().unwrap_or_else(|e| e.into_inner());
            if seq <= *last {
                debug!("discarding out-of-order session update (seq {seq} <= {last})");
                return;
            }
            *last = seq;
            let was_signed_in = self.state.borrow().signed_in();
            self.state
                .send_modify(|state| state.apply_session(session.clone()));
            if was_signed_in {
                None
            } else {
                session
            }
        };

        if let (Some(session), Some(bootstrap)) = (newly_signed_in, self.bootstrap.clone()) {
            // Best-effort side effect; never blocks or fails the sign-in.
            tokio::spawn(async move {
                bootstrap.ensure_user_context(&session).await;
            });
        }
    }

    fn begin_action(&self) {
        let seq = self.next_seq();
        self.apply(seq, |state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn finish_action<T>(&self, result: &Result<T, AuthError>) {
        let seq = self.next_seq();
        let error = result.as_ref().err().map(|e| e.message());
        self.apply(seq, |state| {
            state.loading = false;
            if let Some(message) = error {
                state.error = Some(message);
            }
        });
    }
}

impl SessionManager {
    /// Start the store: hydrate the current session from the provider and
    /// follow its live event stream until the manager is dropped.
    ///
    /// The client and bootstrapper are injected so tests can substitute
    /// stubs. Must be called from within a tokio runtime.
    pub fn spawn(client: Arc<dyn AuthClient>, bootstrap: Option<Arc<dyn Bootstrap>>) -> Self {
        let (state, _) = watch::channel(AuthState::hydrating());
        let inner = Arc::new(Inner {
            client: client.clone(),
            bootstrap,
            state,
            seq: AtomicU64::new(0),
            last_applied: Mutex::new(0),
        });

        // Subscribe before hydration starts so no event is missed in
        // between, and take the hydration sequence number up front so every
        // live event outranks the initial fetch.
        let events = client.subscribe();
        let hydration_seq = inner.next_seq();
        let hydrate_task = tokio::spawn(hydrate(inner.clone(), hydration_seq));
        let event_task = tokio::spawn(follow_events(inner.clone(), events));

        Self {
            inner,
            hydrate_task,
            event_task,
        }
    }

    /// A snapshot of the current auth state.
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to auth state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Register a new account. Validates client-side first; nothing reaches
    /// the provider on a validation failure. On success the provider sends a
    /// verification email and no session is established yet.
    pub async fn sign_up(&self, form: &SignupForm) -> Result<(), AuthError> {
        form.validate()?;
        self.inner.begin_action();
        let result = self.inner.client.sign_up(&form.email, &form.password).await;
        self.inner.finish_action(&result);
        result
    }

    /// Authenticate with email and password. On success the store reflects
    /// the new session via the provider event stream; navigation is the
    /// caller's concern.
    pub async fn sign_in_with_password(&self, form: &LoginForm) -> Result<(), AuthError> {
        form.validate()?;
        self.inner.begin_action();
        let result = self
            .inner
            .client
            .sign_in_with_password(&form.email, &form.password)
            .await;
        self.inner.finish_action(&result);
        result.map(|_| ())
    }

    /// Start an OAuth sign-in. Returns the authorization URL the browser
    /// must be redirected to; the session arrives later through the
    /// callback endpoint's code exchange.
    pub fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AuthError> {
        self.inner.begin_action();
        let result = self.inner.client.sign_in_with_oauth(provider);
        self.inner.finish_action(&result);
        result
    }

    /// Terminate the current session.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.begin_action();
        let result = self.inner.client.sign_out().await;
        self.inner.finish_action(&result);
        result
    }

    /// Clear the error message. Idempotent.
    pub fn clear_error(&self) {
        let seq = self.inner.next_seq();
        self.inner.apply(seq, |state| state.error = None);
    }

    /// Stop following the provider event stream.
    pub fn shutdown(self) {
        // Drop runs the aborts.
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.hydrate_task.abort();
        self.event_task.abort();
    }
}

/// Fetch the initial session. Runs concurrently with the event loop; the
/// sequence number was taken before spawning, so a hydration result that
/// loses the race against a live event gets discarded.
async fn hydrate(inner: Arc<Inner>, seq: u64) {
    match inner.client.get_session().await {
        Ok(session) => inner.apply_session(seq, session),
        Err(e) => {
            let message = e.message();
            inner.apply(seq, |state| {
                state.loading = false;
                state.error = Some(message);
            });
        }
    }
}

async fn follow_events(inner: Arc<Inner>, mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let seq = inner.next_seq();
                match event {
                    AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                        inner.apply_session(seq, Some(session));
                    }
                    AuthEvent::SignedOut => inner.apply_session(seq, None),
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("auth event stream lagged, {skipped} events skipped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
