use reqwest::StatusCode;

/// Failures talking to the remote content store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("content store credentials are not configured")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}: {1}")]
    Status(StatusCode, String),
    #[error("{0} has no downloadable content")]
    MissingContent(String),
    #[error("invalid content: {0}")]
    Decode(String),
    #[error("invalid slug: {0:?}")]
    InvalidSlug(String),
}

impl StoreError {
    /// Whether the store answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Status(status, _) if *status == StatusCode::NOT_FOUND)
    }

    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotConfigured => "not_configured",
            StoreError::Http(_) => "transport",
            StoreError::Status(status, _) if *status == StatusCode::NOT_FOUND => "not_found",
            StoreError::Status(..) => "upstream_status",
            StoreError::MissingContent(_) | StoreError::Decode(_) => "malformed",
            StoreError::InvalidSlug(_) => "invalid_slug",
        }
    }
}
