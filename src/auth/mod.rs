//! Admin authentication
//!
//! A single shared secret guards the admin area. Presenting it sets the
//! `admin-auth=true` trust marker cookie; there is no server-side session, the
//! cookie's own max-age is the only expiry.

pub mod gate;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use std::fmt;

pub use gate::{authorize, require_admin, Access};

/// Name of the trust marker cookie
pub const TRUST_COOKIE: &str = "admin-auth";

/// Value the trust marker must carry
pub const TRUST_VALUE: &str = "true";

/// Trust marker lifetime (24 hours)
pub const TRUST_MAX_AGE_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("ADMIN_PASSWORD not configured")]
    NotConfigured,
    #[error("Invalid JSON in request body")]
    InvalidBody,
    #[error("Password required")]
    MissingPassword,
    #[error("Invalid password")]
    InvalidPassword,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidBody | AuthError::MissingPassword => StatusCode::BAD_REQUEST,
            AuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::NotConfigured => tracing::error!("Login attempted without a configured password"),
            _ => tracing::debug!("Login rejected: {}", self),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Checks submitted passwords against the configured secret
#[derive(Clone, Default)]
pub struct Authenticator {
    secret: Option<String>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl Authenticator {
    /// A blank secret counts as unset
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Compare trimmed `submitted` with the secret, case-sensitively
    pub fn verify(&self, submitted: &str) -> Result<(), AuthError> {
        let secret = self.secret.as_deref().ok_or(AuthError::NotConfigured)?;

        let submitted = submitted.trim();
        if submitted.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        if submitted != secret {
            return Err(AuthError::InvalidPassword);
        }

        Ok(())
    }

    pub fn authenticate(&self, submitted: &str) -> bool {
        self.verify(submitted).is_ok()
    }
}

/// Cookie issued after a successful login
pub fn trust_marker() -> Cookie<'static> {
    Cookie::build((TRUST_COOKIE, TRUST_VALUE))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(TRUST_MAX_AGE_SECS))
        .path("/")
        .build()
}

/// Cookie that makes the browser drop the trust marker
pub fn cleared_marker() -> Cookie<'static> {
    Cookie::build((TRUST_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .path("/")
        .build()
}

/// Whether the request carries a valid trust marker
pub fn is_trusted(jar: &CookieJar) -> bool {
    jar.get(TRUST_COOKIE)
        .map_or(false, |cookie| cookie.value() == TRUST_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_match_is_accepted() {
        let auth = Authenticator::new(Some("hunter2".into()));
        assert!(auth.authenticate(" hunter2 "));
        assert!(auth.authenticate("hunter2"));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let auth = Authenticator::new(Some("hunter2".into()));
        assert!(!auth.authenticate("Hunter2"));
        assert!(matches!(auth.verify("Hunter2"), Err(AuthError::InvalidPassword)));
    }

    #[test]
    fn test_configured_secret_is_trimmed() {
        let auth = Authenticator::new(Some("  hunter2\n".into()));
        assert!(auth.authenticate("hunter2"));
    }

    #[test]
    fn test_unset_secret_always_fails() {
        for secret in [None, Some(String::new()), Some("   ".to_string())] {
            let auth = Authenticator::new(secret);
            assert!(!auth.is_configured());
            assert!(!auth.authenticate("anything"));
            assert!(!auth.authenticate(""));
            assert!(matches!(auth.verify("x"), Err(AuthError::NotConfigured)));
        }
    }

    #[test]
    fn test_missing_password() {
        let auth = Authenticator::new(Some("hunter2".into()));
        assert!(matches!(auth.verify("  "), Err(AuthError::MissingPassword)));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::NotConfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AuthError::InvalidBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::MissingPassword.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InvalidPassword.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_trust_marker_attributes() {
        let cookie = trust_marker();
        assert_eq!(cookie.name(), "admin-auth");
        assert_eq!(cookie.value(), "true");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86_400)));
    }

    #[test]
    fn test_is_trusted() {
        let jar = CookieJar::new();
        assert!(!is_trusted(&jar));
        assert!(is_trusted(&jar.clone().add(trust_marker())));
        assert!(!is_trusted(&jar.add(Cookie::new(TRUST_COOKIE, "false"))));
    }
}
