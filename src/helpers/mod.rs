//! Helper functions for building HTML pages

mod html;
mod url;

pub use html::*;
pub use url::*;
