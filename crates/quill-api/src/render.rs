use quill_types::api::Flashes;
use quill_types::models::{Post, User};

/// The pages the views can ask for, with the data each one shows.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    Index { posts: &'a [Post] },
    Register { username: &'a str },
    Login { username: &'a str },
    Create { title: &'a str, body: &'a str },
    Update { post: &'a Post, title: &'a str, body: &'a str },
}

/// Everything a page render needs: the view plus the per-request chrome.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub view: View<'a>,
    pub user: Option<&'a User>,
    pub flashes: &'a Flashes,
}

pub trait Renderer: Send + Sync {
    fn render(&self, page: &Page<'_>) -> String;
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Plain, dependency-free HTML pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn nav(user: Option<&User>) -> String {
        let links = match user {
            Some(user) => format!(
                "<li><span>{}</span></li>\n    <li><a href=\"/auth/logout\">Log Out</a></li>",
                escape(&user.username)
            ),
            None => "<li><a href=\"/auth/register\">Register</a></li>\n    <li><a href=\"/auth/login\">Log In</a></li>".to_string(),
        };
        format!("<nav>\n  <h1><a href=\"/\">Quill</a></h1>\n  <ul>\n    {links}\n  </ul>\n</nav>")
    }

    fn title(view: &View<'_>) -> &'static str {
        match view {
            View::Index { .. } => "Posts",
            View::Register { .. } => "Register",
            View::Login { .. } => "Log In",
            View::Create { .. } => "New Post",
            View::Update { .. } => "Edit Post",
        }
    }

    fn content(view: &View<'_>, user: Option<&User>) -> String {
        match *view {
            View::Index { posts } => {
                let mut html = String::new();
                if user.is_some() {
                    html.push_str("<a class=\"action\" href=\"/create\">New</a>\n");
                }
                for post in posts {
                    let edit = match user {
                        Some(u) if post.is_authored_by(u) => format!(
                            "\n    <a class=\"action\" href=\"/{}/update\">Edit</a>",
                            post.id
                        ),
                        _ => String::new(),
                    };
                    html.push_str(&format!(
                        "<article class=\"post\">\n  <header>\n    <h1>{}</h1>\n    <div class=\"about\">by {} on {}</div>{}\n  </header>\n  <p class=\"body\">{}</p>\n</article>\n",
                        escape(&post.title),
                        escape(&post.author_username),
                        post.created.format("%Y-%m-%d"),
                        edit,
                        escape(&post.body),
                    ));
                }
                html
            }
            View::Register { username } => Self::auth_form("Register", username),
            View::Login { username } => Self::auth_form("Log In", username),
            View::Create { title, body } => Self::post_form("Save", title, body),
            View::Update { post, title, body } => format!(
                "{}\n<form action=\"/{}/delete\" method=\"post\">\n  <input class=\"danger\" type=\"submit\" value=\"Delete\">\n</form>",
                Self::post_form("Save", title, body),
                post.id
            ),
        }
    }

    fn auth_form(submit: &str, username: &str) -> String {
        format!(
            "<form method=\"post\">\n  <label for=\"username\">Username</label>\n  <input name=\"username\" id=\"username\" value=\"{}\" required>\n  <label for=\"password\">Password</label>\n  <input type=\"password\" name=\"password\" id=\"password\" required>\n  <input type=\"submit\" value=\"{}\">\n</form>",
            escape(username),
            submit
        )
    }

    fn post_form(submit: &str, title: &str, body: &str) -> String {
        format!(
            "<form method=\"post\">\n  <label for=\"title\">Title</label>\n  <input name=\"title\" id=\"title\" value=\"{}\" required>\n  <label for=\"body\">Body</label>\n  <textarea name=\"body\" id=\"body\">{}</textarea>\n  <input type=\"submit\" value=\"{}\">\n</form>",
            escape(title),
            escape(body),
            submit
        )
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, page: &Page<'_>) -> String {
        let title = Self::title(&page.view);
        let flashes: String = page
            .flashes
            .iter()
            .map(|msg| format!("  <div class=\"flash\">{}</div>\n", escape(msg)))
            .collect();

        format!(
            "<!doctype html>\n<title>{title} - Quill</title>\n{nav}\n<section class=\"content\">\n  <header><h1>{title}</h1></header>\n{flashes}{content}\n</section>\n",
            nav = Self::nav(page.user),
            content = Self::content(&page.view, page.user),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(author_id: i64) -> Post {
        Post {
            id: 1,
            title: "<b>Hi</b>".into(),
            body: "body".into(),
            created: Utc::now(),
            author_id,
            author_username: "alice".into(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn anonymous_nav_offers_login() {
        let flashes = Flashes::new();
        let html = HtmlRenderer.render(&Page {
            view: View::Login { username: "" },
            user: None,
            flashes: &flashes,
        });
        assert!(html.contains("href=\"/auth/login\""));
        assert!(html.contains("href=\"/auth/register\""));
    }

    #[test]
    fn flashes_are_rendered_escaped() {
        let flashes = Flashes::from("User <x> is already registered.".to_string());
        let html = HtmlRenderer.render(&Page {
            view: View::Register { username: "<x>" },
            user: None,
            flashes: &flashes,
        });
        assert!(html.contains("User &lt;x&gt; is already registered."));
        assert!(!html.contains("<x>"));
    }

    #[test]
    fn edit_link_only_for_author() {
        let posts = vec![post(1)];
        let flashes = Flashes::new();
        let alice = User { id: 1, username: "alice".into() };
        let bob = User { id: 2, username: "bob".into() };

        let as_alice = HtmlRenderer.render(&Page {
            view: View::Index { posts: &posts },
            user: Some(&alice),
            flashes: &flashes,
        });
        assert!(as_alice.contains("href=\"/1/update\""));
        assert!(as_alice.contains("&lt;b&gt;Hi&lt;/b&gt;"));
        assert!(as_alice.contains("Log Out"));

        let as_bob = HtmlRenderer.render(&Page {
            view: View::Index { posts: &posts },
            user: Some(&bob),
            flashes: &flashes,
        });
        assert!(!as_bob.contains("href=\"/1/update\""));
    }
}
