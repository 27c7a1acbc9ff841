//! URL helper functions

use crate::config::BlogConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/hello-world") // -> "/blog/hello-world"
/// ```
pub fn url_for(config: &BlogConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &BlogConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &str) -> BlogConfig {
        BlogConfig {
            url: "https://example.com/".to_string(),
            root: root.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for(&config("/"), "/"), "/");
        assert_eq!(url_for(&config("/"), "hello"), "/hello");
        assert_eq!(url_for(&config("/blog/"), "/hello"), "/blog/hello");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(
            full_url_for(&config("/"), "/hello"),
            "https://example.com/hello"
        );
    }
}
