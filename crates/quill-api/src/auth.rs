use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use quill_db::Database;
use quill_types::api::{AuthForm, Flashes};
use tracing::info;

use crate::error::BlogError;
use crate::identity;
use crate::middleware::{LOGIN_PATH, RequestContext};
use crate::render::{Page, Renderer, View};
use crate::session::{self, SessionKeys};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session: SessionKeys,
    pub renderer: Box<dyn Renderer>,
}

impl AppStateInner {
    pub fn render(&self, ctx: &RequestContext, view: View<'_>, flashes: &Flashes) -> Html<String> {
        Html(self.renderer.render(&Page {
            view,
            user: ctx.user.as_ref(),
            flashes,
        }))
    }
}

pub async fn register_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Html<String> {
    state.render(&ctx, View::Register { username: "" }, &Flashes::new())
}

pub async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Form(form): Form<AuthForm>,
) -> Result<Response, BlogError> {
    let conn = ctx.db.get_connection()?;

    match identity::register(&conn, &form.username, &form.password) {
        Ok(_) => Ok(Redirect::to(LOGIN_PATH).into_response()),
        Err(e) => {
            let flashes = Flashes::from(e.into_flash()?);
            Ok(state
                .render(&ctx, View::Register { username: &form.username }, &flashes)
                .into_response())
        }
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Html<String> {
    state.render(&ctx, View::Login { username: "" }, &Flashes::new())
}

pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<AuthForm>,
) -> Result<Response, BlogError> {
    let conn = ctx.db.get_connection()?;

    match identity::authenticate(&conn, &form.username, &form.password) {
        Ok(user_id) => {
            let jar = state.session.login(jar, user_id)?;
            info!("User {} logged in", form.username);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(e) => {
            let flashes = Flashes::from(e.into_flash()?);
            Ok(state
                .render(&ctx, View::Login { username: &form.username }, &flashes)
                .into_response())
        }
    }
}

pub async fn logout(Extension(ctx): Extension<RequestContext>, jar: CookieJar) -> impl IntoResponse {
    if let Some(user) = &ctx.user {
        info!("User {} logged out", user.username);
    }
    (session::logout(jar), Redirect::to("/"))
}
