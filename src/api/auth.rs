//! Session authentication middleware.

use super::AppState;
use crate::error::ApiError;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

/// Cookie names that carry the session token, in lookup order.
pub const SESSION_COOKIES: &[&str] = &["session_token", "better-auth.session_token"];

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Resolve the session token and reject the request with 401 if it is
/// missing, unknown or expired.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = session_token(req.headers()) else {
        return ApiError::unauthorized("Not signed in or session missing").into_response();
    };

    match state.db.resolve_session(&token) {
        Ok(Some(user_id)) => {
            req.extensions_mut().insert(CurrentUser(user_id));
            next.run(req).await
        }
        Ok(None) => {
            debug!(path = %req.uri().path(), "Rejected expired or unknown session");
            ApiError::unauthorized("Session expired, please sign in again").into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Session token from the cookie header, falling back to a Bearer token.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(cookie_token);

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

fn cookie_token(cookie_header: &str) -> Option<String> {
    let cookies: Vec<(&str, &str)> = cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .collect();

    SESSION_COOKIES.iter().find_map(|name| {
        cookies
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| urlencoding::decode(value).ok())
            .map(|value| value.into_owned())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_is_url_decoded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=abc%2Edef%3D"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def="));
    }

    #[test]
    fn test_legacy_cookie_name_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("better-auth.session_token=tok"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token="));
        assert_eq!(session_token(&headers), None);
    }
}
