use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{middleware::session::AppState, ministries::find_ministry};
use crate::error::{AppError, Result};
use crate::models::{
    ministry::AdminRole,
    ministry_request::RequestStatus,
    Member, MinistryAdmin, MinistryRequest,
};
use crate::services::access_gate::Principal;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignAdminRequest {
    member_id: Uuid,
    role: AdminRole,
}

async fn list_admins(
    State(state): State<AppState>,
    Path(ministry_id): Path<Uuid>,
) -> Result<Json<Vec<MinistryAdmin>>> {
    find_ministry(&state, ministry_id).await?;

    Ok(Json(
        MinistryAdmin::list_by_ministry(&state.pool, ministry_id).await?,
    ))
}

/// Makes a member an admin of the ministry; does not make them a member
async fn assign_admin(
    State(state): State<AppState>,
    Path(ministry_id): Path<Uuid>,
    Json(req): Json<AssignAdminRequest>,
) -> Result<(StatusCode, Json<MinistryAdmin>)> {
    find_ministry(&state, ministry_id).await?;
    Member::find_by_id(&state.pool, req.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let admin = MinistryAdmin::upsert(&state.pool, ministry_id, req.member_id, req.role).await?;

    tracing::info!(
        ministry_id = %ministry_id,
        member_id = %req.member_id,
        role = req.role.as_str(),
        "Ministry admin assigned"
    );

    Ok((StatusCode::CREATED, Json(admin)))
}

async fn remove_admin(
    State(state): State<AppState>,
    Path((ministry_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    if !MinistryAdmin::remove(&state.pool, ministry_id, member_id).await? {
        return Err(AppError::NotFound(
            "User is not an admin of this ministry".to_string(),
        ));
    }

    tracing::info!(ministry_id = %ministry_id, member_id = %member_id, "Ministry admin removed");

    Ok(StatusCode::NO_CONTENT)
}

async fn list_pending_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<MinistryRequest>>> {
    Ok(Json(MinistryRequest::list_pending(&state.pool).await?))
}

/// Looks up a request that can still be reviewed
async fn find_pending_request(state: &AppState, id: Uuid) -> Result<MinistryRequest> {
    let existing = MinistryRequest::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    if !existing.is_pending() {
        return Err(already_reviewed());
    }

    Ok(existing)
}

fn already_reviewed() -> AppError {
    AppError::Conflict("Request has already been reviewed".to_string())
}

fn log_review(request: &MinistryRequest, reviewer: &Principal) {
    tracing::info!(
        request_id = %request.id,
        status = %request.status,
        reviewer_id = %reviewer.member_id,
        "Ministry request reviewed"
    );
}

/// Approval joins the member and makes the ministry their current one
async fn approve_request(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MinistryRequest>> {
    find_pending_request(&state, id).await?;

    let request = MinistryRequest::approve(&state.pool, id, principal.member_id)
        .await?
        .ok_or_else(already_reviewed)?;

    log_review(&request, &principal);

    Ok(Json(request))
}

async fn reject_request(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MinistryRequest>> {
    find_pending_request(&state, id).await?;

    let request =
        MinistryRequest::review(&state.pool, id, RequestStatus::Rejected, principal.member_id)
            .await?
            .ok_or_else(already_reviewed)?;

    log_review(&request, &principal);

    Ok(Json(request))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ministry-admin/requests", get(list_pending_requests))
        .route("/api/ministry-admin/requests/:id/approve", post(approve_request))
        .route("/api/ministry-admin/requests/:id/reject", post(reject_request))
        .route(
            "/api/ministry-admin/ministries/:ministry_id/admins",
            get(list_admins).post(assign_admin),
        )
        .route(
            "/api/ministry-admin/ministries/:ministry_id/admins/:member_id",
            delete(remove_admin),
        )
}
