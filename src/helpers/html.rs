//! HTML helper functions

use super::url::url_for;
use crate::config::BlogConfig;

/// Escape text for use in element content and quoted attributes
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate an anchor tag
///
/// # Examples
/// ```ignore
/// link_to(&config, "/auth", "Admin Login") // -> <a href="/auth">Admin Login</a>
/// ```
pub fn link_to(config: &BlogConfig, path: &str, text: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(path),
            html_escape(text)
        )
    } else {
        format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&url_for(config, path)),
            html_escape(text)
        )
    }
}

/// Wrap `body` in the shared page skeleton
pub fn layout(config: &BlogConfig, title: &str, body: &str) -> String {
    layout_with_head(config, title, "", body)
}

/// Like [`layout`], with extra markup placed inside `<head>`
pub fn layout_with_head(config: &BlogConfig, title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
{head}</head>
<body>
{body}
</body>
</html>
"#,
        title = html_escape(&page_title(config, title)),
        head = head,
        body = body
    )
}

fn page_title(config: &BlogConfig, title: &str) -> String {
    if title.is_empty() || title == config.title {
        config.title.clone()
    } else {
        format!("{} | {}", title, config.title)
    }
}
