//! Content module - posts, front-matter and rendering

pub mod frontmatter;
mod markdown;
mod post;
pub mod repository;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{humanize_slug, is_safe_slug, is_valid_slug, slugify, split_keywords, NewPost, Post};
pub use repository::PostRepository;
