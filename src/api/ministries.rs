use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::{ministry::MinistryData, Member, Ministry, MinistryMember};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub member_id: Uuid,
}

fn validate_ministry(data: &MinistryData) -> Result<()> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("Ministry name is required".to_string()));
    }
    Ok(())
}

pub(crate) async fn find_ministry(state: &AppState, id: Uuid) -> Result<Ministry> {
    Ministry::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ministry not found".to_string()))
}

async fn list_ministries(State(state): State<AppState>) -> Result<Json<Vec<Ministry>>> {
    Ok(Json(Ministry::list(&state.pool).await?))
}

async fn create_ministry(
    State(state): State<AppState>,
    Json(data): Json<MinistryData>,
) -> Result<(StatusCode, Json<Ministry>)> {
    validate_ministry(&data)?;

    let ministry = Ministry::create(&state.pool, &data).await?;

    tracing::info!(ministry_id = %ministry.id, name = %ministry.name, "Ministry created");

    Ok((StatusCode::CREATED, Json(ministry)))
}

async fn show_ministry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ministry>> {
    Ok(Json(find_ministry(&state, id).await?))
}

async fn update_ministry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<MinistryData>,
) -> Result<Json<Ministry>> {
    validate_ministry(&data)?;

    let ministry = Ministry::update(&state.pool, id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("Ministry not found".to_string()))?;

    Ok(Json(ministry))
}

async fn delete_ministry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !Ministry::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Ministry not found".to_string()));
    }

    tracing::info!(ministry_id = %id, "Ministry deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Member>>> {
    find_ministry(&state, id).await?;

    Ok(Json(Member::list_by_ministry(&state.pool, id).await?))
}

async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MemberRef>,
) -> Result<StatusCode> {
    find_ministry(&state, id).await?;
    Member::find_by_id(&state.pool, req.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    MinistryMember::add(&state.pool, id, req.member_id).await?;

    tracing::info!(ministry_id = %id, member_id = %req.member_id, "Member added to ministry");

    Ok(StatusCode::CREATED)
}

async fn remove_member(
    State(state): State<AppState>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    if !MinistryMember::remove(&state.pool, id, member_id).await? {
        return Err(AppError::NotFound(
            "User is not a member of this ministry".to_string(),
        ));
    }

    tracing::info!(ministry_id = %id, member_id = %member_id, "Member removed from ministry");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ministries", get(list_ministries).post(create_ministry))
        .route(
            "/api/ministries/:id",
            get(show_ministry)
                .put(update_ministry)
                .delete(delete_ministry),
        )
        .route(
            "/api/ministries/:id/members",
            get(list_members).post(add_member),
        )
        .route("/api/ministries/:id/members/:member_id", delete(remove_member))
}
