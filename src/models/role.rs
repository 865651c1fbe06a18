use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_PASTOR: &str = "PASTOR";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Roles that unlock the admin API
    pub fn is_elevated(name: &str) -> bool {
        name == ROLE_ADMIN || name == ROLE_PASTOR
    }

    pub async fn create(
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles ORDER BY name")
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Join between members and roles
pub struct MemberRole;

impl MemberRole {
    /// Names of every role the member holds
    pub async fn role_names(pool: &PgPool, member_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT r.name FROM roles r
            INNER JOIN member_roles mr ON mr.role_id = r.id
            WHERE mr.member_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    /// Grants a role; granting one already held is a no-op
    pub async fn assign(pool: &PgPool, member_id: Uuid, role_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO member_roles (member_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (member_id, role_id) DO NOTHING
            "#,
        )
        .bind(member_id)
        .bind(role_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn revoke(pool: &PgPool, member_id: Uuid, role_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM member_roles WHERE member_id = $1 AND role_id = $2")
            .bind(member_id)
            .bind(role_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
