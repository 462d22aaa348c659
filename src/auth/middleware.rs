use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{extract_bearer_token, AuthError, JwtService, UserSession};

/// Resolve the caller from the `Authorization: Bearer` header.
///
/// Any state that can hand out a [`JwtService`] can authenticate requests, so
/// handlers only need to name `UserSession` in their arguments.
#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    JwtService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token_from_headers(&parts.headers)?;
        let jwt_service = JwtService::from_ref(state);

        jwt_service.extract_user_session(token)
    }
}

pub fn bearer_token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    extract_bearer_token(auth_header)
}

/// Admin-only guard for handlers
pub fn require_admin(session: &UserSession) -> Result<(), AuthError> {
    if !session.is_admin() {
        return Err(AuthError::InsufficientPermissions);
    }
    Ok(())
}

/// Coach or Admin guard for handlers
pub fn require_plan_author_role(session: &UserSession) -> Result<(), AuthError> {
    if !session.role.can_author_plans() {
        return Err(AuthError::InsufficientPermissions);
    }
    Ok(())
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Security headers middleware
pub fn security_headers_layer() -> tower_http::set_header::SetResponseHeaderLayer<axum::http::HeaderValue> {
    tower_http::set_header::SetResponseHeaderLayer::overriding(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        axum::http::HeaderValue::from_static("nosniff"),
    )
}
