//! HTTP server: public pages, admin pages and JSON endpoints

mod api;
mod pages;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use api::ApiError;

use crate::auth::require_admin;
use crate::content::MarkdownRenderer;
use crate::Blog;

/// Shared, read-only request state
pub struct ServerState {
    pub blog: Blog,
    renderer: MarkdownRenderer,
}

/// Build the application router
pub fn router(blog: Blog) -> Router {
    let renderer =
        MarkdownRenderer::with_options(&blog.config.highlight_theme, blog.config.line_number);
    let state = Arc::new(ServerState { blog, renderer });

    Router::new()
        .route("/", get(pages::index))
        .route("/auth", get(pages::login))
        .route("/dashboard", get(pages::dashboard))
        .route("/create", get(pages::create))
        .route("/api/auth", post(api::login))
        .route("/api/logout", post(api::logout))
        .route("/api/posts", post(api::create_post))
        .route("/api/debug", get(api::debug))
        .route("/:slug", get(pages::post))
        .fallback(pages::not_found)
        .layer(middleware::from_fn(require_admin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the blog until Ctrl+C
pub async fn start(blog: Blog, ip: &str, port: u16) -> Result<()> {
    if !blog.posts.is_configured() {
        tracing::warn!("Serving without GitHub credentials, the post list will be empty");
    }
    if !blog.auth.is_configured() {
        tracing::warn!("ADMIN_PASSWORD not set, admin login is disabled");
    }

    let app = router(blog);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
