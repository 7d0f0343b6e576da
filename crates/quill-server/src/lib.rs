pub mod cli;
pub mod config;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use quill_api::auth::{self, AppState, AppStateInner};
use quill_api::blog;
use quill_api::middleware::{load_current_user, open_request_db, require_login};
use quill_api::render::HtmlRenderer;
use quill_api::session::SessionKeys;
use quill_db::Database;

use crate::config::Config;

/// Open the store and assemble the shared state.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    if config.uses_placeholder_secret() && !config.testing {
        warn!("QUILL_SECRET_KEY is unset or still the development placeholder");
    }

    let lifetime = config.session_lifetime()?;
    let db = Database::open(&config.database)?;
    let session = SessionKeys::new(&config.secret_key, lifetime);

    Ok(Arc::new(AppStateInner {
        db,
        session,
        renderer: Box::new(HtmlRenderer),
    }))
}

pub fn build_app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", get(auth::register_form).post(auth::register))
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/logout", get(auth::logout));

    let protected_routes = Router::new()
        .route("/create", get(blog::create_form).post(blog::create))
        .route("/{id}/update", get(blog::update_form).post(blog::update))
        .route("/{id}/delete", post(blog::delete))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/", get(blog::index))
        .route("/hello", get(hello))
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), load_current_user))
        .layer(middleware::from_fn_with_state(state.clone(), open_request_db))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A simple page that says hello.
async fn hello() -> &'static str {
    "Hello, World!"
}
