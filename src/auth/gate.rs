//! Routing gate for the admin pages

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use super::{TRUST_COOKIE, TRUST_VALUE};

/// Path prefixes that need the trust marker
pub const PROTECTED_PREFIXES: [&str; 2] = ["/dashboard", "/create"];

/// Where unauthenticated callers are sent
pub const LOGIN_PATH: &str = "/auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

/// Decide whether `path` may be served given the trust marker value.
///
/// A plain prefix match: no roles, no per-resource rules.
pub fn authorize(path: &str, marker: Option<&str>) -> Access {
    let protected = PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix));

    if protected && marker != Some(TRUST_VALUE) {
        Access::Redirect(LOGIN_PATH)
    } else {
        Access::Allow
    }
}

/// Middleware applying [`authorize`] to every request
pub async fn require_admin(jar: CookieJar, request: Request, next: Next) -> Response {
    let marker = jar.get(TRUST_COOKIE).map(|c| c.value());

    match authorize(request.uri().path(), marker) {
        Access::Allow => next.run(request).await,
        Access::Redirect(to) => {
            tracing::debug!("Redirecting {} to {}", request.uri().path(), to);
            Redirect::temporary(to).into_response()
        }
    }
}
