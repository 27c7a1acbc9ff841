//! CLI entry point for mdblog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdblog")]
#[command(version)]
#[command(about = "A Markdown blog that stores its posts in a GitHub repository", long_about = None)]
struct Cli {
    /// Configuration file (environment variables override its values)
    #[arg(short, long, global = true, default_value = "_config.yml")]
    config: PathBuf,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List the posts in the repository
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdblog=debug,tower_http=debug,info"
    } else {
        "mdblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let blog = mdblog::Blog::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port, ip } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blog.serve(&ip, port).await?;
        }

        Commands::List => {
            if !blog.posts.is_configured() {
                anyhow::bail!("GITHUB_OWNER, GITHUB_REPO and GITHUB_TOKEN must be set");
            }

            let posts = blog.posts.fetch_posts().await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    post.publish_date.as_deref().unwrap_or("----------"),
                    post.title,
                    post.slug
                );
            }
        }
    }

    Ok(())
}
