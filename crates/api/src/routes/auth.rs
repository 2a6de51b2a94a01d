//! Authentication routes for login and the current account.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::CurrentPrincipal};
use edupace_core::access::{Principal, Role, RoleKind, UnknownRole};
use edupace_core::auth::{display_name, equalize_login_timing, verify_password};
use edupace_db::{ProfileRepository, UserRepository};
use edupace_shared::auth::{LoginRequest, LoginResponse, UserInfo};
use edupace_shared::types::UserId;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Creates the auth routes that need a resolved principal.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

fn invalid_credentials() -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        INVALID_CREDENTIALS,
    )
}

/// POST /auth/login - Authenticate and return an access token.
///
/// The selected role must equal the role resolved from the account's profiles.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let selected: RoleKind = payload
        .role
        .parse()
        .map_err(|e: UnknownRole| {
            ApiError::bad_request("invalid_role", e.to_string())
        })?;

    let user_repo = UserRepository::new((*state.db).clone());
    let Some(user) = user_repo.find_by_username(payload.username.trim()).await? else {
        info!(username = %payload.username, "Login attempt for non-existent user");
        equalize_login_timing(&payload.password);
        return Err(invalid_credentials());
    };

    if !user.is_active {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "account_disabled",
            "This account has been disabled",
        ));
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return Err(invalid_credentials());
        }
        Err(e) => return Err(ApiError::internal("Password verification error", e)),
    }

    let profiles = ProfileRepository::new((*state.db).clone())
        .load_profiles(user.id)
        .await?;
    let principal = Principal::authenticated(UserId::from_uuid(user.id), profiles);

    if principal.kind() != selected {
        warn!(
            user_id = %user.id,
            selected = %selected,
            resolved = %principal.kind(),
            "Login role mismatch"
        );
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "role_mismatch",
            format!("This account is not registered as a {}.", selected.label()),
        ));
    }

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, selected.as_str())
        .map_err(|e| ApiError::internal("Failed to generate access token", e))?;

    info!(user_id = %user.id, role = %selected, "User logged in successfully");

    Ok(Json(LoginResponse {
        user: UserInfo {
            id: user.id,
            display_name: display_name(&user.first_name, &user.last_name, &user.username),
            username: user.username,
            role: selected.as_str().to_string(),
        },
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}

/// Current account with its resolved role and profile identifiers.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Account ID.
    pub id: Uuid,
    /// Login handle.
    pub username: String,
    /// Full name, or the login handle.
    pub display_name: String,
    /// Contact email.
    pub email: String,
    /// Resolved role.
    pub role: RoleKind,
    /// External student identifier, for students.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Employee identifier, for teachers and board members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
}

/// GET /me - The authenticated account.
async fn me(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
) -> Result<Json<MeResponse>, ApiError> {
    let user_id = principal.user_id()?;
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(user_id.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let employee_id = match &principal.role {
        Role::Teacher(t) => Some(t.employee_id.clone()),
        Role::AcademicBoard(b) => Some(b.employee_id.clone()),
        _ => None,
    };

    Ok(Json(MeResponse {
        id: user.id,
        display_name: display_name(&user.first_name, &user.last_name, &user.username),
        username: user.username,
        email: user.email,
        role: principal.kind(),
        student_id: principal.student().map(|s| s.student_id.clone()),
        employee_id,
    }))
}
