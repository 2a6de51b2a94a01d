//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::{AppState, error::ApiError};
use edupace_core::access::{PermissionError, Principal};
use edupace_db::{ProfileRepository, UserRepository};
use edupace_shared::{JwtError, types::UserId};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(code: &str, message: &str) -> Response {
    ApiError::new(StatusCode::UNAUTHORIZED, code, message).into_response()
}

/// Authentication middleware that resolves the request principal.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Loads the account and its profiles and resolves the role once
/// 4. Stores the [`Principal`] in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        );
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => return unauthorized("token_expired", "Token has expired"),
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return unauthorized("invalid_token", "Invalid or malformed token");
        }
    };

    let user_id = claims.user_id();
    let user = match UserRepository::new((*state.db).clone())
        .find_by_id(user_id)
        .await
    {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => {
            warn!(user_id = %user_id, "Token presented for missing or inactive account");
            return unauthorized("invalid_token", "Invalid or malformed token");
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    let profiles = match ProfileRepository::new((*state.db).clone())
        .load_profiles(user.id)
        .await
    {
        Ok(profiles) => profiles,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let principal = Principal::authenticated(UserId::from_uuid(user.id), profiles);
    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Extractor for the resolved caller.
///
/// Requests that did not pass through [`auth_middleware`] are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl CurrentPrincipal {
    /// Returns the account ID.
    ///
    /// # Errors
    ///
    /// Returns `PermissionError::Unauthenticated` for an anonymous principal.
    pub fn user_id(&self) -> Result<UserId, PermissionError> {
        self.0.user_id.ok_or(PermissionError::Unauthenticated)
    }
}

impl std::ops::Deref for CurrentPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(|| PermissionError::Unauthenticated.into())
    }
}
