//! Self-service ministry dashboards.
//!
//! Every route needs a signed-in member; ministry routes then apply the
//! per-ministry read or write check.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{
    middleware::session::AppState,
    ministries::{find_ministry, MemberRef},
};
use crate::error::{conflict_on_unique, AppError, Result};
use crate::models::{
    ministry::AdminRole, Member, Ministry, MinistryAdmin, MinistryMember, MinistryRequest,
};
use crate::services::access_gate::{
    self, AccessMode, MinistryAction, PortalFlags, Principal,
};
use crate::services::stats::{self, StatsScope, StatsSummary};

const PENDING_REQUEST_EXISTS: &str = "A request for this user is already pending";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortalIdentity {
    member: Member,
    #[serde(flatten)]
    flags: PortalFlags,
}

async fn ensure_access(
    state: &AppState,
    principal: &Principal,
    ministry_id: Uuid,
    mode: AccessMode,
) -> Result<Ministry> {
    // Checked before existence: outsiders get 403 for unknown ministries too
    access_gate::authorize_ministry_access(&state.pool, principal, ministry_id, mode)
        .await?
        .into_result()?;

    find_ministry(state, ministry_id).await
}

async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<PortalIdentity>> {
    let member = Member::find_by_id(&state.pool, principal.member_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(PortalIdentity {
        member,
        flags: principal.flags(),
    }))
}

/// Every member, for "add member" pickers
async fn list_all_members(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Member>>> {
    access_gate::authorize_member_listing(&state.pool, &principal)
        .await?
        .into_result()?;

    Ok(Json(Member::list_all(&state.pool).await?))
}

async fn my_ministries(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Ministry>>> {
    Ok(Json(
        Ministry::list_for_member(&state.pool, principal.member_id).await?,
    ))
}

async fn show_ministry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ministry>> {
    let ministry = ensure_access(&state, &principal, id, AccessMode::Read).await?;

    Ok(Json(ministry))
}

async fn ministry_members(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Member>>> {
    ensure_access(&state, &principal, id, AccessMode::Read).await?;

    Ok(Json(Member::list_by_ministry(&state.pool, id).await?))
}

async fn ministry_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatsSummary>> {
    ensure_access(&state, &principal, id, AccessMode::Read).await?;

    let members = Member::list_by_ministry(&state.pool, id).await?;
    let summary = stats::aggregate(&members, &StatsScope::Ministry, Utc::now().date_naive());

    Ok(Json(summary))
}

/// Asks for a member to be added; an ADMIN or PASTOR reviews it
async fn send_join_request(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<MemberRef>,
) -> Result<(StatusCode, Json<MinistryRequest>)> {
    ensure_access(
        &state,
        &principal,
        id,
        AccessMode::Write(MinistryAction::SendJoinRequest),
    )
    .await?;

    Member::find_by_id(&state.pool, req.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if MinistryMember::exists(&state.pool, id, req.member_id).await? {
        return Err(AppError::Conflict(
            "User is already a member of this ministry".to_string(),
        ));
    }
    if MinistryRequest::find_pending(&state.pool, id, req.member_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(PENDING_REQUEST_EXISTS.to_string()));
    }

    let request = MinistryRequest::create(&state.pool, id, req.member_id, principal.member_id)
        .await
        .map_err(|e| conflict_on_unique(e, PENDING_REQUEST_EXISTS))?;

    tracing::info!(
        request_id = %request.id,
        ministry_id = %id,
        member_id = %req.member_id,
        "Ministry join request sent"
    );

    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
struct ChangeRoleRequest {
    role: AdminRole,
}

async fn change_member_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<MinistryAdmin>> {
    ensure_access(
        &state,
        &principal,
        id,
        AccessMode::Write(MinistryAction::ChangeMemberRole),
    )
    .await?;

    // Only existing admin assignments are re-roled; granting admin-ship
    // stays with the admin API
    let admin = MinistryAdmin::change_role(&state.pool, id, member_id, req.role)
        .await?
        .ok_or_else(|| AppError::NotFound("User is not an admin of this ministry".to_string()))?;

    tracing::info!(
        ministry_id = %id,
        member_id = %member_id,
        role = req.role.as_str(),
        changed_by = %principal.member_id,
        "Ministry member role changed"
    );

    Ok(Json(admin))
}

async fn remove_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    ensure_access(
        &state,
        &principal,
        id,
        AccessMode::Write(MinistryAction::RemoveMember),
    )
    .await?;

    if !MinistryMember::remove(&state.pool, id, member_id).await? {
        return Err(AppError::NotFound(
            "User is not a member of this ministry".to_string(),
        ));
    }

    tracing::info!(
        ministry_id = %id,
        member_id = %member_id,
        removed_by = %principal.member_id,
        "Member removed from ministry"
    );

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/portal/me", get(me))
        .route("/api/portal/members", get(list_all_members))
        .route("/api/portal/ministries", get(my_ministries))
        .route("/api/portal/ministries/:id", get(show_ministry))
        .route("/api/portal/ministries/:id/members", get(ministry_members))
        .route("/api/portal/ministries/:id/stats", get(ministry_stats))
        .route("/api/portal/ministries/:id/requests", post(send_join_request))
        .route(
            "/api/portal/ministries/:id/members/:member_id/role",
            put(change_member_role),
        )
        .route(
            "/api/portal/ministries/:id/members/:member_id",
            delete(remove_member),
        )
}
