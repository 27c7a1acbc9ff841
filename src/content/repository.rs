//! Post repository - reads and writes posts through the content store
//!
//! Reads are fail-soft: `list_posts` and `get_post` never surface errors, a
//! broken backend must not take the homepage down. The `fetch_*` variants keep
//! the error kind for callers that want it.

use futures::future::join_all;
use std::cmp::Ordering;

use super::post::{is_safe_slug, is_valid_slug, Post};
use crate::config::StoreConfig;
use crate::store::{GitHubStore, StoreError};

/// Typed access to the posts directory of the store
#[derive(Debug, Clone)]
pub struct PostRepository {
    store: GitHubStore,
    posts_dir: String,
}

impl PostRepository {
    pub fn new(store: GitHubStore, posts_dir: &str) -> Self {
        Self {
            store,
            posts_dir: posts_dir.trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(GitHubStore::new(config)?, &config.posts_dir))
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    fn post_path(&self, slug: &str) -> String {
        if self.posts_dir.is_empty() {
            format!("{}.md", slug)
        } else {
            format!("{}/{}.md", self.posts_dir, slug)
        }
    }

    /// All posts, newest first; entries that fail to load are skipped
    pub async fn fetch_posts(&self) -> Result<Vec<Post>, StoreError> {
        let entries = self.store.list_dir(&self.posts_dir).await?;

        let slugs: Vec<String> = entries
            .iter()
            .filter(|e| e.kind.as_deref().map_or(true, |k| k == "file"))
            .filter_map(|e| e.name.strip_suffix(".md"))
            .map(str::to_string)
            .collect();
        tracing::debug!("Found {} post files in {}", slugs.len(), self.posts_dir);

        let results = join_all(slugs.iter().map(|slug| self.fetch_post(slug))).await;

        let mut posts = Vec::with_capacity(results.len());
        for (slug, result) in slugs.iter().zip(results) {
            match result {
                Ok(post) => posts.push(post),
                Err(e) => {
                    tracing::warn!(kind = e.kind(), "Failed to load post {}: {}", slug, e);
                }
            }
        }

        posts.sort_by(newest_first);
        Ok(posts)
    }

    /// One post by slug
    pub async fn fetch_post(&self, slug: &str) -> Result<Post, StoreError> {
        if !is_safe_slug(slug) {
            return Err(StoreError::InvalidSlug(slug.to_string()));
        }

        let source = self.store.read_file(&self.post_path(slug)).await?;
        Ok(Post::from_source(slug, &source))
    }

    /// Commit `post` as `<posts_dir>/<slug>.md`.
    ///
    /// There is no collision check: an existing file with the same slug is
    /// handled by the store itself.
    pub async fn publish(&self, post: &Post) -> Result<(), StoreError> {
        if !is_valid_slug(&post.slug) {
            return Err(StoreError::InvalidSlug(post.slug.clone()));
        }

        let message = format!("Create post: {}", post.title);
        self.store
            .put_file(
                &self.post_path(&post.slug),
                &message,
                post.to_source().as_bytes(),
            )
            .await
    }

    /// All posts, or an empty list if the store is unavailable
    pub async fn list_posts(&self) -> Vec<Post> {
        match self.fetch_posts().await {
            Ok(posts) => posts,
            Err(StoreError::NotConfigured) => {
                tracing::warn!("GitHub store not configured, listing no posts");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Failed to fetch posts: {}", e);
                Vec::new()
            }
        }
    }

    /// The post for `slug`, or `None` on any failure
    pub async fn get_post(&self, slug: &str) -> Option<Post> {
        match self.fetch_post(slug).await {
            Ok(post) => Some(post),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Post not found: {}", slug);
                None
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Failed to load post {}: {}", slug, e);
                None
            }
        }
    }

    /// Whether the store acknowledged the commit
    pub async fn create_post(&self, post: &Post) -> bool {
        match self.publish(post).await {
            Ok(()) => {
                tracing::info!("Created post {}", post.slug);
                true
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Failed to create post {}: {}", post.slug, e);
                false
            }
        }
    }
}

/// Dated posts first, most recent date first, then by slug
fn newest_first(a: &Post, b: &Post) -> Ordering {
    let by_date = match (&a.publish_date, &b.publish_date) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.slug.cmp(&b.slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repository(api_url: &str) -> PostRepository {
        let config = StoreConfig {
            api_url: api_url.to_string(),
            owner: Some("octo".into()),
            repo: Some("blog".into()),
            token: Some("t0ken".into()),
            ..Default::default()
        };
        PostRepository::from_config(&config).unwrap()
    }

    fn repository_on_branch(api_url: &str, branch: &str) -> PostRepository {
        let config = StoreConfig {
            api_url: api_url.to_string(),
            owner: Some("octo".into()),
            repo: Some("blog".into()),
            token: Some("t0ken".into()),
            branch: Some(branch.to_string()),
            ..Default::default()
        };
        PostRepository::from_config(&config).unwrap()
    }

    fn unconfigured(api_url: &str) -> PostRepository {
        let config = StoreConfig {
            api_url: api_url.to_string(),
            ..Default::default()
        };
        PostRepository::from_config(&config).unwrap()
    }

    async fn mount_post(server: &MockServer, slug: &str, body: &str) {
        let download_url = format!("{}/raw/{}.md", server.uri(), slug);

        Mock::given(method("GET"))
            .and(path(format!("/repos/octo/blog/contents/posts/{}.md", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": format!("{}.md", slug),
                "path": format!("posts/{}.md", slug),
                "download_url": download_url,
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/raw/{}.md", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_post_parses_frontmatter() {
        let mock_server = MockServer::start().await;
        mount_post(&mock_server, "hello-world", "---\ntitle: Hello\n---\nBody text").await;

        let repo = repository(&mock_server.uri());
        let post = repo.get_post("hello-world").await.unwrap();

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "Body text");
    }

    #[tokio::test]
    async fn test_get_post_missing_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let repo = repository(&mock_server.uri());
        assert!(repo.get_post("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_get_post_server_error_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let repo = repository(&mock_server.uri());
        assert!(repo.get_post("hello").await.is_none());
        assert!(matches!(
            repo.fetch_post("hello").await,
            Err(StoreError::Status(status, _)) if status.as_u16() == 502
        ));
    }

    #[tokio::test]
    async fn test_get_post_rejects_path_slugs_without_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let repo = repository(&mock_server.uri());
        assert!(repo.get_post("../secrets").await.is_none());
        assert!(repo.get_post("..").await.is_none());
        assert!(repo.get_post("").await.is_none());
    }

    #[tokio::test]
    async fn test_dotted_file_names_are_posts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/blog/contents/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "release-1.0.md", "path": "posts/release-1.0.md", "type": "file"}
            ])))
            .mount(&mock_server)
            .await;
        mount_post(&mock_server, "release-1.0", "---\ntitle: Release 1.0\n---\nShipped").await;

        let repo = repository(&mock_server.uri());

        let posts = repo.list_posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "release-1.0");

        let post = repo.get_post("release-1.0").await.unwrap();
        assert_eq!(post.title, "Release 1.0");
        assert_eq!(post.content, "Shipped");
    }

    #[tokio::test]
    async fn test_list_posts_drops_failures_and_sorts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/blog/contents/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "old.md", "path": "posts/old.md", "type": "file"},
                {"name": "new.md", "path": "posts/new.md", "type": "file"},
                {"name": "broken.md", "path": "posts/broken.md", "type": "file"},
                {"name": "image.png", "path": "posts/image.png", "type": "file"},
                {"name": "drafts", "path": "posts/drafts", "type": "dir"}
            ])))
            .mount(&mock_server)
            .await;

        mount_post(&mock_server, "old", "---\ntitle: Old\npublishDate: 2023-01-01\n---\nx").await;
        mount_post(&mock_server, "new", "---\ntitle: New\npublishDate: 2024-06-01\n---\ny").await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/blog/contents/posts/broken.md"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let repo = repository(&mock_server.uri());
        let posts = repo.list_posts().await;

        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_list_posts_listing_failure_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let repo = repository(&mock_server.uri());
        assert!(repo.list_posts().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_posts_unconfigured_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let repo = unconfigured(&mock_server.uri());
        assert!(repo.list_posts().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_post_commits_encoded_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/repos/octo/blog/contents/posts/hello-world.md"))
            .and(body_partial_json(json!({"message": "Create post: Hello World"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let post = Post {
            slug: "hello-world".into(),
            title: "Hello World".into(),
            description: None,
            author: Some("Ada".into()),
            publish_date: Some("2024-01-01".into()),
            keywords: vec!["intro".into()],
            og_image: None,
            canonical_url: None,
            content: "Body".into(),
        };

        let repo = repository(&mock_server.uri());
        assert!(repo.create_post(&post).await);

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let decoded = BASE64.decode(body["content"].as_str().unwrap()).unwrap();
        let text = String::from_utf8(decoded).unwrap();

        assert_eq!(
            text,
            "---\ntitle: Hello World\nauthor: Ada\npublishDate: 2024-01-01\nkeywords: intro\n---\n\nBody\n"
        );
        assert!(body.get("branch").is_none());
    }

    #[tokio::test]
    async fn test_create_post_commits_to_configured_branch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/repos/octo/blog/contents/posts/draft.md"))
            .and(body_partial_json(json!({"branch": "drafts"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let post = Post::from_source("draft", "---\ntitle: Draft\n---\nx");
        let repo = repository_on_branch(&mock_server.uri(), "drafts");
        assert!(repo.create_post(&post).await);
    }

    #[tokio::test]
    async fn test_create_post_store_rejection_is_false() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&mock_server)
            .await;

        let post = Post::from_source("taken", "---\ntitle: Taken\n---\nx");
        let repo = repository(&mock_server.uri());
        assert!(!repo.create_post(&post).await);
    }

    #[tokio::test]
    async fn test_create_post_unconfigured_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let post = Post::from_source("x", "x");
        let repo = unconfigured(&mock_server.uri());
        assert!(!repo.create_post(&post).await);
    }
}
