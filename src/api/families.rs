use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::{
    family::{ChildData, FamilyData},
    Child, Family, Member,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFamiliesQuery {
    zone_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListChildrenQuery {
    parent_id: Option<Uuid>,
}

fn validate_family(data: &FamilyData) -> Result<()> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("Family name is required".to_string()));
    }
    Ok(())
}

async fn list_families(
    State(state): State<AppState>,
    Query(params): Query<ListFamiliesQuery>,
) -> Result<Json<Vec<Family>>> {
    Ok(Json(Family::list(&state.pool, params.zone_id).await?))
}

async fn create_family(
    State(state): State<AppState>,
    Json(data): Json<FamilyData>,
) -> Result<(StatusCode, Json<Family>)> {
    validate_family(&data)?;

    let family = Family::create(&state.pool, &data).await?;

    tracing::info!(family_id = %family.id, "Family created");

    Ok((StatusCode::CREATED, Json(family)))
}

async fn show_family(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Family>> {
    let family = Family::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Family not found".to_string()))?;

    Ok(Json(family))
}

async fn update_family(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<FamilyData>,
) -> Result<Json<Family>> {
    validate_family(&data)?;

    let family = Family::update(&state.pool, id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("Family not found".to_string()))?;

    Ok(Json(family))
}

async fn delete_family(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !Family::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Family not found".to_string()));
    }

    tracing::info!(family_id = %id, "Family deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn family_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Member>>> {
    Family::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Family not found".to_string()))?;

    Ok(Json(Member::list_by_family(&state.pool, id).await?))
}

async fn list_children(
    State(state): State<AppState>,
    Query(params): Query<ListChildrenQuery>,
) -> Result<Json<Vec<Child>>> {
    Ok(Json(Child::list(&state.pool, params.parent_id).await?))
}

async fn create_child(
    State(state): State<AppState>,
    Json(data): Json<ChildData>,
) -> Result<(StatusCode, Json<Child>)> {
    if data.first_name.trim().is_empty() || data.last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Child first and last name are required".to_string(),
        ));
    }

    Member::find_by_id(&state.pool, data.parent_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Parent not found".to_string()))?;

    let child = Child::create(&state.pool, &data).await?;

    tracing::info!(child_id = %child.id, parent_id = %child.parent_id, "Child created");

    Ok((StatusCode::CREATED, Json(child)))
}

async fn delete_child(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !Child::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Child not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/families", get(list_families).post(create_family))
        .route(
            "/api/families/:id",
            get(show_family).put(update_family).delete(delete_family),
        )
        .route("/api/families/:id/members", get(family_members))
        .route("/api/children", get(list_children).post(create_child))
        .route("/api/children/:id", delete(delete_child))
}
