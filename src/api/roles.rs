use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{conflict_on_unique, AppError, Result};
use crate::models::Role;

#[derive(Debug, Deserialize)]
struct CreateRoleRequest {
    name: String,
    description: Option<String>,
}

/// Role names are stored upper-case, e.g. "ADMIN"
fn normalize_role_name(name: &str) -> Result<String> {
    let name = name.trim().to_uppercase();
    if name.is_empty() {
        return Err(AppError::Validation("Role name is required".to_string()));
    }
    Ok(name)
}

async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>> {
    Ok(Json(Role::list(&state.pool).await?))
}

async fn create_role(
    State(state): State<AppState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<Role>)> {
    let name = normalize_role_name(&req.name)?;

    let role = Role::create(&state.pool, &name, req.description.as_deref())
        .await
        .map_err(|e| conflict_on_unique(e, "Role already exists"))?;

    tracing::info!(role = %role.name, "Role created");

    Ok((StatusCode::CREATED, Json(role)))
}

async fn delete_role(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !Role::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Role not found".to_string()));
    }

    tracing::info!(role_id = %id, "Role deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/roles", get(list_roles).post(create_role))
        .route("/api/roles/:id", delete(delete_role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_role_name() {
        assert_eq!(normalize_role_name(" usher ").unwrap(), "USHER");
        assert!(normalize_role_name("   ").is_err());
    }
}
