use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::api::middleware::{
    auth::get_authenticated_member,
    session::{AppState, SESSION_KEY_MEMBER_ID, SESSION_KEY_SIGNED_IN_AT},
};
use crate::error::{AppError, Result};
use crate::models::{Credential, Member};
use crate::services::access_gate::{self, PortalFlags};
use crate::services::credentials;

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub member: Member,
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub flags: PortalFlags,
}

async fn session_info(state: &AppState, member: Member) -> Result<SessionInfo> {
    let principal = access_gate::resolve_principal(&state.pool, member.id).await?;
    let flags = principal.flags();

    Ok(SessionInfo {
        member,
        roles: principal.roles,
        flags,
    })
}

/// Signs a member in with email and password
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionInfo>> {
    let member = Member::find_by_email(&state.pool, req.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let credential = Credential::find_by_member_id(&state.pool, member.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = credentials::verify_secret(&req.password, &credential.hashed())
        .map_err(|e| AppError::Internal(e.into()))?;

    if !valid {
        tracing::warn!(member_id = %member.id, "Rejected login attempt");
        return Err(AppError::Unauthorized);
    }

    // Fresh session id on privilege change
    session.cycle_id().await?;
    session.insert(SESSION_KEY_MEMBER_ID, member.id).await?;
    session
        .insert(SESSION_KEY_SIGNED_IN_AT, Utc::now().to_rfc3339())
        .await?;

    tracing::info!(member_id = %member.id, "Member authenticated successfully");

    Ok(Json(session_info(&state, member).await?))
}

/// Logs out the user
async fn logout(session: Session) -> Result<StatusCode> {
    session.flush().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the signed-in member with roles and flags
async fn me(State(state): State<AppState>, session: Session) -> Result<Json<SessionInfo>> {
    let authenticated = get_authenticated_member(&session).await?;

    let member = Member::find_by_id(&state.pool, authenticated.member_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(session_info(&state, member).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}
