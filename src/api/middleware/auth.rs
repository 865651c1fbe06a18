use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use uuid::Uuid;

use super::session::{AppState, SESSION_KEY_MEMBER_ID};
use crate::error::AppError;
use crate::services::access_gate::{self, Principal, APP_ADMIN_ROLES};

/// Extension type that holds the authenticated member ID
#[derive(Debug, Clone)]
pub struct AuthenticatedMember {
    pub member_id: Uuid,
}

/// Extracts the authenticated member ID from the session
pub async fn get_authenticated_member(session: &Session) -> Result<AuthenticatedMember, AppError> {
    let member_id: Uuid = session
        .get(SESSION_KEY_MEMBER_ID)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(AuthenticatedMember { member_id })
}

/// Middleware for the portal: any signed-in member, roles resolved
pub async fn require_member(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let member = get_authenticated_member(&session).await?;
    let principal = access_gate::resolve_principal(&state.pool, member.member_id).await?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Admits a principal to the admin namespace, or explains why not
pub fn admit_app_admin(principal: Principal, path: &str) -> Result<Principal, AppError> {
    if let Err(denial) = access_gate::authorize(&principal, &APP_ADMIN_ROLES).into_result() {
        tracing::warn!(
            member_id = %principal.member_id,
            path = %path,
            "Admin API access denied"
        );
        return Err(denial.into());
    }

    Ok(principal)
}

/// Middleware for the admin namespace: caller must be ADMIN or PASTOR
pub async fn require_app_admin(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let member = get_authenticated_member(&session).await?;
    let principal = access_gate::resolve_principal(&state.pool, member.member_id).await?;
    let principal = admit_app_admin(principal, request.uri().path())?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            member_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_member_without_roles_is_forbidden() {
        let err = admit_app_admin(principal(&[]), "/api/users").unwrap_err();

        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unrelated_role_is_forbidden() {
        let err = admit_app_admin(principal(&["USHER"]), "/api/zones").unwrap_err();
        assert!(err.to_string().contains("ADMIN or PASTOR"));
    }

    #[test]
    fn test_admin_and_pastor_are_admitted() {
        let admin = admit_app_admin(principal(&["ADMIN"]), "/api/users").unwrap();
        assert!(admin.is_admin());

        let pastor = admit_app_admin(principal(&["PASTOR", "USHER"]), "/api/stats/admin").unwrap();
        assert!(pastor.is_pastor());
    }
}
