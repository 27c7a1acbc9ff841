//! Server-rendered HTML pages

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use super::ServerState;
use crate::config::BlogConfig;
use crate::content::Post;
use crate::helpers::{full_url_for, html_escape, layout, layout_with_head, link_to, url_for};

const LOGIN_SCRIPT: &str = r#"<script>
document.getElementById('login-form').addEventListener('submit', async function (e) {
  e.preventDefault();
  var message = document.getElementById('message');
  message.textContent = '';
  var res = await fetch(__API__, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ password: e.target.password.value })
  });
  if (res.ok) {
    location.href = __NEXT__;
    return;
  }
  var data = await res.json().catch(function () { return {}; });
  message.textContent = data.error || 'Login failed';
});
</script>"#;

const CREATE_SCRIPT: &str = r#"<script>
document.getElementById('create-form').addEventListener('submit', async function (e) {
  e.preventDefault();
  var message = document.getElementById('message');
  message.textContent = 'Creating post...';
  var data = Object.fromEntries(new FormData(e.target).entries());
  var res = await fetch(__API__, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(data)
  });
  if (res.ok) {
    message.textContent = 'Post created successfully!';
    setTimeout(function () { location.href = __NEXT__; }, 1000);
  } else {
    message.textContent = 'Error creating post';
  }
});
</script>"#;

/// Fill the URL placeholders of an inline script with JS string literals
fn script(template: &str, config: &BlogConfig, api: &str, next: &str) -> String {
    let literal = |path: &str| {
        serde_json::to_string(&url_for(config, path)).unwrap_or_else(|_| "\"/\"".to_string())
    };
    template
        .replace("__API__", &literal(api))
        .replace("__NEXT__", &literal(next))
}

fn cached(config: &BlogConfig, html: String) -> Response {
    (
        [(
            header::CACHE_CONTROL,
            format!("public, max-age={}", config.cache_max_age),
        )],
        Html(html),
    )
        .into_response()
}

/// "By Ada on 2024-01-01", or whichever half is known
fn byline(post: &Post) -> Option<String> {
    match (post.author.as_deref(), post.publish_date.as_deref()) {
        (Some(author), Some(date)) => Some(format!(
            "By {} on {}",
            html_escape(author),
            html_escape(date)
        )),
        (Some(author), None) => Some(format!("By {}", html_escape(author))),
        (None, Some(date)) => Some(format!("On {}", html_escape(date))),
        (None, None) => None,
    }
}

/// Home page listing every post
pub async fn index(State(state): State<Arc<ServerState>>) -> Response {
    let config = &state.blog.config;
    let posts = state.blog.posts.list_posts().await;

    let mut body = String::from("<main>\n");
    body.push_str(&format!("<h1>{}</h1>\n", html_escape(&config.title)));
    body.push_str(&link_to(config, "/auth", "Admin Login"));
    body.push_str("\n<hr>\n");

    if posts.is_empty() {
        body.push_str("<p>No posts found</p>\n");
    } else {
        body.push_str("<ul>\n");
        for post in &posts {
            body.push_str("<li>\n");
            body.push_str(&format!(
                "<a href=\"{}\"><h2>{}</h2></a>\n",
                html_escape(&url_for(config, &post.slug)),
                html_escape(&post.title)
            ));
            if let Some(description) = &post.description {
                body.push_str(&format!("<p>{}</p>\n", html_escape(description)));
            }
            if let Some(line) = byline(post) {
                body.push_str(&format!("<small>{}</small>\n", line));
            }
            body.push_str("</li>\n");
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</main>");

    cached(config, layout(config, &config.title, &body))
}

/// A single rendered post
pub async fn post(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    let config = &state.blog.config;

    let Some(post) = state.blog.posts.get_post(&slug).await else {
        return post_not_found(config);
    };

    let content = match state.renderer.render(&post.content) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Failed to render post {}: {}", slug, e);
            format!("<pre>{}</pre>", html_escape(&post.content))
        }
    };

    let mut body = String::from("<main>\n<article>\n");
    body.push_str(&link_to(config, "/", "← Back to posts"));
    body.push_str("\n<header>\n");
    body.push_str(&format!("<h1>{}</h1>\n", html_escape(&post.title)));
    if let Some(description) = &post.description {
        body.push_str(&format!("<p>{}</p>\n", html_escape(description)));
    }
    if let Some(line) = byline(&post) {
        body.push_str(&format!("<div>{}</div>\n", line));
    }
    body.push_str("</header>\n");
    body.push_str(&format!("<div class=\"content\">\n{}</div>\n", content));
    body.push_str("</article>\n</main>");

    let head = format!(
        "<link rel=\"canonical\" href=\"{}\">\n",
        html_escape(&canonical_url(config, &post))
    );
    cached(config, layout_with_head(config, &post.title, &head, &body))
}

/// The post's own canonical URL, or its absolute address on this site
fn canonical_url(config: &BlogConfig, post: &Post) -> String {
    post.canonical_url
        .clone()
        .unwrap_or_else(|| full_url_for(config, &post.slug))
}

fn post_not_found(config: &BlogConfig) -> Response {
    let body = format!(
        "<main>\n<h1>Post not found</h1>\n{}\n</main>",
        link_to(config, "/", "Return to home")
    );
    (
        StatusCode::NOT_FOUND,
        Html(layout(config, "Post not found", &body)),
    )
        .into_response()
}

/// Login form
pub async fn login(State(state): State<Arc<ServerState>>) -> Html<String> {
    let config = &state.blog.config;
    let body = format!(
        r#"<main>
<h1>Admin Login</h1>
<form id="login-form">
<label>Password: <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p id="message"></p>
{}
</main>
{}"#,
        link_to(config, "/", "Back to posts"),
        script(LOGIN_SCRIPT, config, "/api/auth", "/dashboard")
    );
    Html(layout(config, "Admin Login", &body))
}

/// Admin landing page, behind the routing gate
pub async fn dashboard(State(state): State<Arc<ServerState>>) -> Html<String> {
    let config = &state.blog.config;
    let body = format!(
        "<main>\n<h1>Admin Dashboard</h1>\n{}\n<hr>\n{}\n</main>",
        link_to(config, "/create", "Create New Blog Post"),
        link_to(config, "/", "View All Posts")
    );
    Html(layout(config, "Admin Dashboard", &body))
}

/// New post form, behind the routing gate
pub async fn create(State(state): State<Arc<ServerState>>) -> Html<String> {
    let config = &state.blog.config;
    let today = chrono::Local::now().format("%Y-%m-%d");

    let body = format!(
        r#"<main>
<h1>Create New Blog Post</h1>
<form id="create-form">
<div><label>Title (required): <input type="text" name="title" required></label></div>
<div><label>Meta Description: <textarea name="description" placeholder="150-160 characters recommended"></textarea></label></div>
<div><label>Content (required): <textarea name="content" rows="10" required></textarea></label></div>
<div><label>Author: <input type="text" name="author"></label></div>
<div><label>Publish Date: <input type="date" name="publishDate" value="{today}"></label></div>
<div><label>Keywords: <input type="text" name="keywords" placeholder="keyword1, keyword2, keyword3"></label></div>
<div><label>OG Image URL: <input type="url" name="ogImage" placeholder="https://example.com/image.jpg"></label></div>
<div><label>Canonical URL: <input type="url" name="canonicalUrl" placeholder="https://example.com/original-post"></label></div>
<button type="submit">Create Post</button>
</form>
<p id="message"></p>
{dashboard}
</main>
{script}"#,
        today = today,
        dashboard = link_to(config, "/dashboard", "Back to dashboard"),
        script = script(CREATE_SCRIPT, config, "/api/posts", "/dashboard")
    );
    Html(layout(config, "Create Post", &body))
}

/// Anything without a route
pub async fn not_found(State(state): State<Arc<ServerState>>) -> Response {
    let config = &state.blog.config;
    let body = format!(
        "<main>\n<h1>Not found</h1>\n{}\n</main>",
        link_to(config, "/", "Return to home")
    );
    (StatusCode::NOT_FOUND, Html(layout(config, "Not found", &body))).into_response()
}
