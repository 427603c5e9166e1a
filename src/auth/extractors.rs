use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use mongodb::bson::oid::ObjectId;
use tracing::warn;

use crate::{auth::jwt::JwtKeys, error::ApiError, state::AppState};

/// Authenticated caller's id and email, extracted from a verified session
/// token. Gates every mutating campaign operation and the profile lookup.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: ObjectId,
    pub email: String,
}

pub struct AuthUser(pub Identity);

/// Pulls the session token out of a `Cookie` header. An empty value counts
/// as absent, which is what a cleared cookie looks like.
fn token_from_cookie_header(cookies: &str) -> Option<&str> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_cookie_header)
            .ok_or_else(|| ApiError::Unauthorized("Access denied. No token provided.".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid session token");
            ApiError::Forbidden("Invalid token.".into())
        })?;

        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ApiError::Forbidden("Invalid token.".into()))?;

        Ok(AuthUser(Identity {
            user_id,
            email: claims.email,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_token_among_other_cookies() {
        let header = "theme=dark; token=abc.def.ghi; lang=en";
        assert_eq!(token_from_cookie_header(header), Some("abc.def.ghi"));
    }

    #[test]
    fn finds_a_lone_token() {
        assert_eq!(token_from_cookie_header("token=xyz"), Some("xyz"));
    }

    #[test]
    fn missing_token_is_none() {
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header(""), None);
    }

    #[test]
    fn cleared_cookie_counts_as_absent() {
        assert_eq!(token_from_cookie_header("token="), None);
    }
}
