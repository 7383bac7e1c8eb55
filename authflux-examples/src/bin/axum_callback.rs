//! # Axum Callback Example
//!
//! Runs the OAuth callback endpoint against a real hosted provider. Set
//! `AUTHFLUX_PROJECT_URL`, `AUTHFLUX_API_KEY` and `AUTHFLUX_REDIRECT_URI`,
//! then visit the URL printed for your OAuth provider; the return leg lands
//! on `/auth/callback`, which exchanges the one-time code for a session.

use std::sync::Arc;

use authflux::{
    callback_router, AuthClient, AuthfluxState, CallbackConfig, ContextBootstrapper,
    GotrueClient, GotrueConfig, SessionManager,
};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use url::Url;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = GotrueConfig::from_env().expect("provider configuration missing");
    let client: Arc<dyn AuthClient> = Arc::new(GotrueClient::new(config));

    let backend_url = std::env::var("AUTHFLUX_BACKEND_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());
    let bootstrap = Arc::new(ContextBootstrapper::new(
        Url::parse(&backend_url).expect("AUTHFLUX_BACKEND_URL is not a valid URL"),
    ));

    let manager = Arc::new(SessionManager::spawn(client.clone(), Some(bootstrap)));

    let login_url = client
        .sign_in_with_oauth("google")
        .expect("failed to build authorize URL");
    println!("Login with Google: {login_url}");

    let state = AuthfluxState {
        client,
        callback: CallbackConfig::default(),
    };

    let app = Router::new()
        .route(
            "/",
            get(move || {
                let state = manager.state();
                async move {
                    Html(match state.user {
                        Some(user) => format!("<h1>Signed in as {}</h1>", user.id),
                        None => "<h1>Signed out</h1>".to_string(),
                    })
                }
            }),
        )
        .merge(callback_router())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("Listening on http://0.0.0.0:3000");
    axum::serve(listener, app).await.unwrap();
}
