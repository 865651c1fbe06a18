use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{conflict_on_unique, AppError, Result};
use crate::models::{member::MemberData, Credential, Member, MemberRole, Role};
use crate::services::credentials;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub zone_id: Option<Uuid>,
    pub ministry_id: Option<Uuid>,
}

pub(crate) fn validate_member(data: &MemberData) -> Result<()> {
    if data.first_name.trim().is_empty() {
        return Err(AppError::Validation("First name is required".to_string()));
    }
    if data.last_name.trim().is_empty() {
        return Err(AppError::Validation("Last name is required".to_string()));
    }
    if let Some(email) = &data.email {
        if !email.contains('@') {
            return Err(AppError::Validation("Email address is invalid".to_string()));
        }
    }
    Ok(())
}

async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
) -> Result<Json<Vec<Member>>> {
    let members = match (params.zone_id, params.ministry_id) {
        (Some(zone_id), _) => Member::list_by_zone(&state.pool, zone_id).await?,
        (None, Some(ministry_id)) => Member::list_by_ministry(&state.pool, ministry_id).await?,
        (None, None) => Member::list_all(&state.pool).await?,
    };

    Ok(Json(members))
}

async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<MemberData>,
) -> Result<(StatusCode, Json<Member>)> {
    validate_member(&data)?;

    let member = Member::create(&state.pool, &data)
        .await
        .map_err(|e| conflict_on_unique(e, "Email is already in use"))?;

    tracing::info!(member_id = %member.id, "Member created");

    Ok((StatusCode::CREATED, Json(member)))
}

async fn show_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Member>> {
    let member = Member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(member))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<MemberData>,
) -> Result<Json<Member>> {
    validate_member(&data)?;

    let member = Member::update(&state.pool, id, &data)
        .await
        .map_err(|e| conflict_on_unique(e, "Email is already in use"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(member_id = %member.id, "Member updated");

    Ok(Json(member))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !Member::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(member_id = %id, "Member deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn list_user_roles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<String>>> {
    Member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MemberRole::role_names(&state.pool, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
    pub password: Option<String>,
}

/// Grants a role. Promotion to ADMIN or PASTOR also sets login credentials.
async fn assign_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<Vec<String>>> {
    let member = Member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let role = Role::find_by_name(&state.pool, req.role.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {} not found", req.role)))?;

    if Role::is_elevated(&role.name) {
        if member.email.is_none() {
            return Err(AppError::Validation(
                "An email address is required before granting an admin role".to_string(),
            ));
        }

        match req.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                let hashed = credentials::hash_secret(password)
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                Credential::set(&state.pool, member.id, &hashed).await?;
                tracing::info!(member_id = %member.id, "Login credentials set");
            }
            None => {
                if Credential::find_by_member_id(&state.pool, member.id)
                    .await?
                    .is_none()
                {
                    return Err(AppError::Validation(
                        "A password is required when granting an admin role".to_string(),
                    ));
                }
            }
        }
    }

    MemberRole::assign(&state.pool, member.id, role.id).await?;

    tracing::info!(member_id = %member.id, role = %role.name, "Role assigned");

    Ok(Json(MemberRole::role_names(&state.pool, member.id).await?))
}

async fn revoke_role(
    State(state): State<AppState>,
    Path((id, role_name)): Path<(Uuid, String)>,
) -> Result<StatusCode> {
    let role = Role::find_by_name(&state.pool, &role_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {} not found", role_name)))?;

    if !MemberRole::revoke(&state.pool, id, role.id).await? {
        return Err(AppError::NotFound("User does not hold this role".to_string()));
    }

    tracing::info!(member_id = %id, role = %role.name, "Role revoked");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(show_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/:id/roles", get(list_user_roles).post(assign_role))
        .route("/api/users/:id/roles/:role_name", delete(revoke_role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(first: &str, last: &str, email: Option<&str>) -> MemberData {
        MemberData {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.map(str::to_string),
            ..MemberData::default()
        }
    }

    #[test]
    fn test_validate_member() {
        assert!(validate_member(&data("Ruth", "Moab", Some("ruth@example.org"))).is_ok());
        assert!(validate_member(&data("Ruth", "Moab", None)).is_ok());
        assert!(matches!(
            validate_member(&data(" ", "Moab", None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_member(&data("Ruth", "", None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_member(&data("Ruth", "Moab", Some("not-an-email"))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_member_payload_uses_wire_labels() {
        let payload = r#"{
            "firstName": "Boaz",
            "lastName": "Bethlehem",
            "marriageStatus": "MARRIED",
            "familyRole": "FATHER",
            "baptizedYear": 1999
        }"#;
        let data: MemberData = serde_json::from_str(payload).unwrap();
        assert_eq!(data.marriage_status.map(|s| s.as_str()), Some("MARRIED"));
        assert_eq!(data.family_role.map(|r| r.as_str()), Some("FATHER"));
        assert!(!data.from_other_church);

        let bad = r#"{"firstName": "A", "lastName": "B", "marriageStatus": "married"}"#;
        assert!(serde_json::from_str::<MemberData>(bad).is_err());
    }
}
