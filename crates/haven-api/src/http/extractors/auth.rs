//! Bearer token authentication extractor.
//!
//! Extracts and verifies login tokens from:
//! - `Authorization: Bearer <token>` header
//! - `X-Auth-Token: <token>` header
//!
//! Tokens are resolved through `AuthService::authenticate`, which compares
//! SHA-256 digests against the `auth_tokens` table.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use haven_types::error::AuthError;
use haven_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated user of a request, plus the token it presented.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;

        match state.auth_service.authenticate(&token).await {
            Ok(user) => Ok(AuthUser { user, token }),
            Err(AuthError::InvalidToken) => Err(AppError::Unauthorized(
                "Invalid or expired token. Log in again via POST /api/v1/auth/login.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Extract the token from request headers.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    if let Some(token) = parts.headers.get("x-auth-token") {
        let token_str = token.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-Auth-Token header encoding".to_string())
        })?;
        return Ok(token_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing token. Provide via 'Authorization: Bearer <token>' or 'X-Auth-Token: <token>' header.".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/me");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_is_used() {
        let token = extract_token(&parts(&[("Authorization", "Bearer hvn_abc ")])).unwrap();
        assert_eq!(token, "hvn_abc");
    }

    #[test]
    fn x_auth_token_is_fallback() {
        let token = extract_token(&parts(&[
            ("Authorization", "Basic dXNlcjpwYXNz"),
            ("X-Auth-Token", "hvn_def"),
        ]))
        .unwrap();
        assert_eq!(token, "hvn_def");
    }

    #[test]
    fn missing_token_is_unauthorized() {
        assert!(matches!(
            extract_token(&parts(&[])),
            Err(AppError::Unauthorized(_))
        ));
    }
}
