use axum::{
    Extension, Form,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use quill_types::api::{Flashes, PostForm};
use quill_types::models::PostId;

use crate::auth::AppState;
use crate::error::BlogError;
use crate::middleware::{CurrentUser, RequestContext};
use crate::posts;
use crate::render::View;

/// `{id}` path segment. Anything that isn't an integer is a 404, the same
/// as an id with no post behind it.
pub struct PostIdPath(pub PostId);

impl<S: Send + Sync> FromRequestParts<S> for PostIdPath {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        parse_post_id(&raw)
            .map(PostIdPath)
            .ok_or_else(|| StatusCode::NOT_FOUND.into_response())
    }
}

/// Digits only: `str::parse` would also take a sign.
fn parse_post_id(raw: &str) -> Option<PostId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Show all the posts, most recent first.
pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Html<String>, BlogError> {
    let posts = posts::list_posts(&ctx.db.get_connection()?)?;
    Ok(state.render(&ctx, View::Index { posts: &posts }, &Flashes::new()))
}

pub async fn create_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    CurrentUser(_): CurrentUser,
) -> Html<String> {
    state.render(&ctx, View::Create { title: "", body: "" }, &Flashes::new())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PostForm>,
) -> Result<Response, BlogError> {
    let conn = ctx.db.get_connection()?;

    match posts::create_post(&conn, &form.title, &form.body, user.id) {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            let flashes = Flashes::from(e.into_flash()?);
            let view = View::Create { title: &form.title, body: &form.body };
            Ok(state.render(&ctx, view, &flashes).into_response())
        }
    }
}

pub async fn update_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    CurrentUser(user): CurrentUser,
    PostIdPath(id): PostIdPath,
) -> Result<Html<String>, BlogError> {
    let post = posts::get_post(&ctx.db.get_connection()?, id, true, Some(&user))?;
    let view = View::Update { post: &post, title: &post.title, body: &post.body };
    Ok(state.render(&ctx, view, &Flashes::new()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    CurrentUser(user): CurrentUser,
    PostIdPath(id): PostIdPath,
    Form(form): Form<PostForm>,
) -> Result<Response, BlogError> {
    let conn = ctx.db.get_connection()?;

    match posts::update_post(&conn, id, &form.title, &form.body, &user) {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            let flashes = Flashes::from(e.into_flash()?);
            let post = posts::get_post(&conn, id, true, Some(&user))?;
            let view = View::Update { post: &post, title: &form.title, body: &form.body };
            Ok(state.render(&ctx, view, &flashes).into_response())
        }
    }
}

pub async fn delete(
    Extension(ctx): Extension<RequestContext>,
    CurrentUser(user): CurrentUser,
    PostIdPath(id): PostIdPath,
) -> Result<Redirect, BlogError> {
    posts::delete_post(&ctx.db.get_connection()?, id, &user)?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_id_accepts_plain_digits() {
        assert_eq!(parse_post_id("1"), Some(1));
        assert_eq!(parse_post_id("0042"), Some(42));
    }

    #[test]
    fn post_id_rejects_signs_and_junk() {
        for raw in ["", "+1", "-1", " 1", "1a", "abc", "99999999999999999999"] {
            assert_eq!(parse_post_id(raw), None, "{raw:?}");
        }
    }
}
