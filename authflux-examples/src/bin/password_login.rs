//! # Password Login Example
//!
//! Signs in against a hosted provider with email and password, watches the
//! session store react, and signs out again. Pass the email and password as
//! arguments:
//!
//! ```sh
//! cargo run --bin password_login -- user@example.com hunter2
//! ```

use std::sync::Arc;

use authflux::{
    AuthClient, ContextBootstrapper, GotrueClient, GotrueConfig, LoginForm, SessionManager,
};
use url::Url;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("usage: password_login <email> <password>");
        std::process::exit(2);
    };

    let config = GotrueConfig::from_env().expect("provider configuration missing");
    let client: Arc<dyn AuthClient> = Arc::new(GotrueClient::new(config));

    let bootstrap = std::env::var("AUTHFLUX_BACKEND_URL").ok().map(|backend| {
        Arc::new(ContextBootstrapper::new(
            Url::parse(&backend).expect("AUTHFLUX_BACKEND_URL is not a valid URL"),
        )) as Arc<dyn authflux::Bootstrap>
    });

    let manager = SessionManager::spawn(client, bootstrap);
    let mut updates = manager.subscribe();

    let form = LoginForm { email, password };
    match manager.sign_in_with_password(&form).await {
        Ok(()) => {
            let state = updates
                .wait_for(|s| s.signed_in())
                .await
                .expect("state channel closed")
                .clone();
            let user = state.user.expect("signed in without a user");
            println!("Signed in as {} ({:?})", user.id, user.email);
        }
        Err(e) => {
            eprintln!("Sign-in failed: {e}");
            std::process::exit(1);
        }
    }

    manager.sign_out().await.expect("sign-out failed");
    println!("Signed out");
}
