use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use quill_db::RequestDb;
use quill_types::models::User;
use tracing::warn;

use crate::auth::AppState;
use crate::identity;

pub const LOGIN_PATH: &str = "/auth/login";

/// Per-request context handed to every view: the request's database handle
/// and the user bound to it, if any.
#[derive(Clone)]
pub struct RequestContext {
    pub db: RequestDb,
    pub user: Option<User>,
}

/// Outermost request hook: give the request its own database handle and
/// close it once the response is built.
pub async fn open_request_db(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let db = state.db.request();
    req.extensions_mut().insert(db.clone());

    let response = next.run(req).await;

    if let Err(e) = db.close_connection() {
        warn!("Failed to close request connection: {}", e);
    }
    response
}

/// Resolve the session cookie to a user and publish the [`RequestContext`].
pub async fn load_current_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(db) = req.extensions().get::<RequestDb>().cloned() else {
        warn!("load_current_user mounted without open_request_db");
        return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let jar = CookieJar::from_headers(req.headers());
    let session = state.session.from_jar(&jar);

    let user = match identity::resolve_current_user(&db, session.as_ref()) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(RequestContext { db, user });
    next.run(req).await
}

/// Guard for protected routes: anonymous requests are sent to the login page
/// and never reach the handler.
pub async fn require_login(req: Request, next: Next) -> Response {
    let logged_in = req
        .extensions()
        .get::<RequestContext>()
        .is_some_and(|ctx| ctx.user.is_some());

    if !logged_in {
        return Redirect::to(LOGIN_PATH).into_response();
    }
    next.run(req).await
}

/// The logged-in user. Extracting it is the capability check: without a
/// user the handler is skipped and the client redirected to log in.
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.user.clone())
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}
