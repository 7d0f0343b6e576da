//! Post repository. Every mutation goes through [`get_post`] with the
//! author check on, so no path edits or deletes someone else's post.

use quill_db::DbConn;
use quill_types::models::{Post, PostId, User, UserId};
use tracing::{info, warn};

use crate::error::BlogError;

pub fn list_posts(conn: &DbConn) -> Result<Vec<Post>, BlogError> {
    Ok(conn.list_posts()?.into_iter().map(Post::from).collect())
}

/// Fetch a post by id. With `check_author`, anyone but its author (including
/// nobody) gets `Forbidden`.
pub fn get_post(
    conn: &DbConn,
    id: PostId,
    check_author: bool,
    current_user: Option<&User>,
) -> Result<Post, BlogError> {
    let post: Post = conn.get_post(id)?.ok_or(BlogError::NotFound(id))?.into();

    if check_author && !current_user.is_some_and(|user| post.is_authored_by(user)) {
        warn!(
            "User {:?} denied access to post {} by {}",
            current_user.map(|u| u.id),
            id,
            post.author_id
        );
        return Err(BlogError::Forbidden);
    }

    Ok(post)
}

fn require_title(title: &str) -> Result<(), BlogError> {
    if title.is_empty() {
        return Err(BlogError::Validation("Title is required.".into()));
    }
    Ok(())
}

pub fn create_post(
    conn: &DbConn,
    title: &str,
    body: &str,
    author_id: UserId,
) -> Result<PostId, BlogError> {
    require_title(title)?;

    let id = conn.insert_post(title, body, author_id)?;
    conn.commit()?;

    info!("User {} created post {}", author_id, id);
    Ok(id)
}

pub fn update_post(
    conn: &DbConn,
    id: PostId,
    title: &str,
    body: &str,
    current_user: &User,
) -> Result<(), BlogError> {
    get_post(conn, id, true, Some(current_user))?;
    require_title(title)?;

    conn.update_post(id, title, body)?;
    conn.commit()?;

    info!("User {} updated post {}", current_user.id, id);
    Ok(())
}

pub fn delete_post(conn: &DbConn, id: PostId, current_user: &User) -> Result<(), BlogError> {
    get_post(conn, id, true, Some(current_user))?;

    conn.delete_post(id)?;
    conn.commit()?;

    info!("User {} deleted post {}", current_user.id, id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::register;
    use crate::test_support::TempDb;

    fn user(conn: &DbConn, name: &str) -> User {
        let id = register(conn, name, "pw").unwrap();
        User {
            id,
            username: name.to_string(),
        }
    }

    #[test]
    fn create_requires_title() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");

        let err = create_post(&conn, "", "body", alice.id).unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Title is required."));
        assert!(list_posts(&conn).unwrap().is_empty());
    }

    #[test]
    fn created_post_carries_author_and_timestamp() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");

        let id = create_post(&conn, "Hi", "", alice.id).unwrap();
        let post = get_post(&conn, id, true, Some(&alice)).unwrap();

        assert_eq!(post.title, "Hi");
        assert_eq!(post.body, "");
        assert_eq!(post.author_username, "alice");
        assert!(post.created.timestamp() > 0);
    }

    #[test]
    fn missing_post_is_not_found() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");

        assert!(matches!(
            get_post(&conn, 99, false, None),
            Err(BlogError::NotFound(99))
        ));
        assert!(matches!(
            update_post(&conn, 99, "t", "", &alice),
            Err(BlogError::NotFound(99))
        ));
        assert!(matches!(
            delete_post(&conn, 99, &alice),
            Err(BlogError::NotFound(99))
        ));
    }

    #[test]
    fn author_check() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");
        let bob = user(&conn, "bob");
        let id = create_post(&conn, "Hi", "body", alice.id).unwrap();

        assert!(get_post(&conn, id, true, Some(&alice)).is_ok());
        assert!(matches!(
            get_post(&conn, id, true, Some(&bob)),
            Err(BlogError::Forbidden)
        ));
        assert!(matches!(get_post(&conn, id, true, None), Err(BlogError::Forbidden)));
        // Without the check anyone can read it.
        assert!(get_post(&conn, id, false, Some(&bob)).is_ok());
    }

    #[test]
    fn non_author_cannot_update_or_delete() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");
        let bob = user(&conn, "bob");
        let id = create_post(&conn, "Hi", "body", alice.id).unwrap();

        assert!(matches!(
            update_post(&conn, id, "pwned", "", &bob),
            Err(BlogError::Forbidden)
        ));
        assert!(matches!(delete_post(&conn, id, &bob), Err(BlogError::Forbidden)));

        let post = get_post(&conn, id, false, None).unwrap();
        assert_eq!(post.title, "Hi");
        assert_eq!(post.body, "body");
    }

    #[test]
    fn ownership_is_checked_before_title() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");
        let bob = user(&conn, "bob");
        let id = create_post(&conn, "Hi", "", alice.id).unwrap();

        assert!(matches!(
            update_post(&conn, id, "", "", &bob),
            Err(BlogError::Forbidden)
        ));
        assert!(matches!(
            update_post(&conn, id, "", "", &alice),
            Err(BlogError::Validation(_))
        ));
    }

    #[test]
    fn author_updates_and_deletes() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");
        let id = create_post(&conn, "Hi", "body", alice.id).unwrap();
        let created = get_post(&conn, id, false, None).unwrap().created;

        update_post(&conn, id, "updated", "new body", &alice).unwrap();
        let post = get_post(&conn, id, true, Some(&alice)).unwrap();
        assert_eq!(post.title, "updated");
        assert_eq!(post.body, "new body");
        assert_eq!(post.created, created);
        assert_eq!(post.author_id, alice.id);

        delete_post(&conn, id, &alice).unwrap();
        assert!(list_posts(&conn).unwrap().iter().all(|p| p.id != id));
    }

    #[test]
    fn list_is_newest_first() {
        let tmp = TempDb::new();
        let conn = tmp.conn();
        let alice = user(&conn, "alice");
        let bob = user(&conn, "bob");

        let a = create_post(&conn, "a", "", alice.id).unwrap();
        let b = create_post(&conn, "b", "", bob.id).unwrap();

        let posts = list_posts(&conn).unwrap();
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(posts[0].author_username, "bob");
    }
}
