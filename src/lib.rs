//! mdblog: a small Markdown blog backed by a GitHub repository
//!
//! Posts live as `<slug>.md` files with a front-matter header in a GitHub
//! repository. The public pages read them through the contents API, and a
//! password-gated admin area commits new ones.

pub mod auth;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::Path;

/// The blog application: configuration plus the components built from it
#[derive(Clone)]
pub struct Blog {
    /// Blog configuration
    pub config: config::BlogConfig,
    /// Post storage
    pub posts: content::PostRepository,
    /// Admin password check
    pub auth: auth::Authenticator,
}

impl Blog {
    /// Build every component from an already resolved configuration
    pub fn new(config: config::BlogConfig) -> Result<Self> {
        let posts = content::PostRepository::from_config(&config.store)?;
        let auth = auth::Authenticator::new(config.admin_password.clone());

        Ok(Self {
            config,
            posts,
            auth,
        })
    }

    /// Load `config_path` (if present), overlay the environment and build
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        Self::new(config::BlogConfig::resolve(config_path)?)
    }

    /// Start the HTTP server
    pub async fn serve(self, ip: &str, port: u16) -> Result<()> {
        server::start(self, ip, port).await
    }
}
