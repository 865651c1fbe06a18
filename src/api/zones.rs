use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::{
    role::ROLE_PASTOR,
    zone::ZoneData,
    Member, MemberRole, Zone,
};

/// A zone's pastor must be an existing member holding the PASTOR role
async fn ensure_pastor(state: &AppState, pastor_id: Uuid) -> Result<()> {
    Member::find_by_id(&state.pool, pastor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pastor not found".to_string()))?;

    let roles = MemberRole::role_names(&state.pool, pastor_id).await?;
    if !roles.iter().any(|r| r == ROLE_PASTOR) {
        return Err(AppError::Validation(
            "Assigned member does not hold the PASTOR role".to_string(),
        ));
    }

    Ok(())
}

async fn validate_zone(state: &AppState, data: &ZoneData) -> Result<()> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("Zone name is required".to_string()));
    }
    if let Some(pastor_id) = data.pastor_id {
        ensure_pastor(state, pastor_id).await?;
    }
    Ok(())
}

async fn list_zones(State(state): State<AppState>) -> Result<Json<Vec<Zone>>> {
    Ok(Json(Zone::list(&state.pool).await?))
}

async fn create_zone(
    State(state): State<AppState>,
    Json(data): Json<ZoneData>,
) -> Result<(StatusCode, Json<Zone>)> {
    validate_zone(&state, &data).await?;

    let zone = Zone::create(&state.pool, &data).await?;

    tracing::info!(zone_id = %zone.id, name = %zone.name, "Zone created");

    Ok((StatusCode::CREATED, Json(zone)))
}

async fn show_zone(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Zone>> {
    let zone = Zone::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;

    Ok(Json(zone))
}

async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<ZoneData>,
) -> Result<Json<Zone>> {
    validate_zone(&state, &data).await?;

    let zone = Zone::update(&state.pool, id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;

    tracing::info!(zone_id = %zone.id, "Zone updated");

    Ok(Json(zone))
}

async fn delete_zone(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !Zone::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Zone not found".to_string()));
    }

    tracing::info!(zone_id = %id, "Zone deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignPastorRequest {
    pastor_id: Uuid,
}

/// Reassigns the zone's pastor; members stay where they are
async fn assign_pastor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignPastorRequest>,
) -> Result<Json<Zone>> {
    ensure_pastor(&state, req.pastor_id).await?;

    let zone = Zone::assign_pastor(&state.pool, id, req.pastor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;

    tracing::info!(zone_id = %zone.id, pastor_id = %req.pastor_id, "Zone pastor reassigned");

    Ok(Json(zone))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/zones", get(list_zones).post(create_zone))
        .route(
            "/api/zones/:id",
            get(show_zone).put(update_zone).delete(delete_zone),
        )
        .route("/api/zones/:id/pastor", put(assign_pastor))
}
