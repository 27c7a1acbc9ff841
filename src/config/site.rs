//! Blog configuration (_config.yml plus environment overlay)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Main blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Site
    pub title: String,
    pub url: String,
    pub root: String,

    // Admin
    pub admin_password: Option<String>,

    // Rendering
    pub highlight_theme: String,
    pub line_number: bool,

    /// Seconds public pages may be cached by clients and proxies
    pub cache_max_age: u64,

    // Remote content store
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            admin_password: None,

            highlight_theme: "base16-ocean.dark".to_string(),
            line_number: false,

            cache_max_age: 60,

            store: StoreConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BlogConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay values from the environment.
    ///
    /// `lookup` is `std::env::var` in the binary; tests pass a fabricated map.
    /// Blank values are ignored so an exported-but-empty variable never wipes
    /// a value from the config file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SITE_TITLE") {
            self.title = v;
        }
        if let Some(v) = get("SITE_URL") {
            self.url = v;
        }
        if let Some(v) = get("ADMIN_PASSWORD") {
            self.admin_password = Some(v);
        }
        if let Some(v) = get("GITHUB_OWNER") {
            self.store.owner = Some(v);
        }
        if let Some(v) = get("GITHUB_REPO") {
            self.store.repo = Some(v);
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.store.token = Some(v);
        }
        if let Some(v) = get("GITHUB_BRANCH") {
            self.store.branch = Some(v);
        }
        if let Some(v) = get("GITHUB_API_URL") {
            self.store.api_url = v;
        }
    }

    /// Load `path` if it exists, then overlay the process environment
    pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            tracing::debug!("Loading configuration from {:?}", path);
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }
}

/// GitHub repository that holds the posts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub api_url: String,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    /// Branch to commit new posts to; the repository default when unset
    pub branch: Option<String>,
    pub posts_dir: String,
    pub user_agent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: None,
            repo: None,
            token: None,
            branch: None,
            posts_dir: "posts".to_string(),
            user_agent: "mdblog".to_string(),
        }
    }
}

/// Owner, repository and token, all present and non-blank
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl StoreConfig {
    /// Returns `None` unless every credential is set
    pub fn credentials(&self) -> Option<Credentials> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Credentials {
            owner: present(&self.owner)?,
            repo: present(&self.repo)?,
            token: present(&self.token)?,
        })
    }
}
