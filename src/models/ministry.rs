use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ministry {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinistryData {
    pub name: String,
    pub description: Option<String>,
}

/// Member count for one ministry, in store order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MinistryRollup {
    pub ministry_id: Uuid,
    pub name: String,
    pub member_count: i64,
}

impl Ministry {
    pub async fn create(pool: &PgPool, data: &MinistryData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO ministries (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM ministries WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM ministries ORDER BY created_at")
            .fetch_all(pool)
            .await
    }

    /// Ministries the member belongs to or administers
    pub async fn list_for_member(
        pool: &PgPool,
        member_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM ministries
            WHERE id IN (SELECT ministry_id FROM ministry_members WHERE member_id = $1)
               OR id IN (SELECT ministry_id FROM ministry_admins WHERE member_id = $1)
            ORDER BY name
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &MinistryData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE ministries
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ministries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ministries")
            .fetch_one(pool)
            .await
    }

    /// Per-ministry member counts for the admin dashboard
    pub async fn rollups(pool: &PgPool) -> Result<Vec<MinistryRollup>, sqlx::Error> {
        sqlx::query_as::<_, MinistryRollup>(
            r#"
            SELECT
                mi.id AS ministry_id,
                mi.name,
                (SELECT COUNT(*) FROM ministry_members mm WHERE mm.ministry_id = mi.id) AS member_count
            FROM ministries mi
            ORDER BY mi.created_at
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

/// Membership relation between members and ministries
pub struct MinistryMember;

impl MinistryMember {
    pub async fn exists(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM ministry_members
                WHERE ministry_id = $1 AND member_id = $2
            )
            "#,
        )
        .bind(ministry_id)
        .bind(member_id)
        .fetch_one(pool)
        .await
    }

    /// Adds a member; adding an existing member is a no-op
    pub async fn add<'e, E>(executor: E, ministry_id: Uuid, member_id: Uuid) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO ministry_members (ministry_id, member_id)
            VALUES ($1, $2)
            ON CONFLICT (ministry_id, member_id) DO NOTHING
            "#,
        )
        .bind(ministry_id)
        .bind(member_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Ends a membership. A member whose current ministry was this one is
    /// left without a current ministry.
    pub async fn remove(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result =
            sqlx::query("DELETE FROM ministry_members WHERE ministry_id = $1 AND member_id = $2")
                .bind(ministry_id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE members
            SET current_ministry_id = NULL, updated_at = NOW()
            WHERE id = $1 AND current_ministry_id = $2
            "#,
        )
        .bind(member_id)
        .bind(ministry_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    Member,
    Leader,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Member => "MEMBER",
            AdminRole::Leader => "LEADER",
        }
    }
}

/// Admin assignment on a ministry. Independent of ministry membership.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MinistryAdmin {
    pub ministry_id: Uuid,
    pub member_id: Uuid,
    pub role: String, // "MEMBER" or "LEADER"
    pub assigned_at: DateTime<Utc>,
}

impl MinistryAdmin {
    pub async fn find(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM ministry_admins WHERE ministry_id = $1 AND member_id = $2",
        )
        .bind(ministry_id)
        .bind(member_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_ministry(
        pool: &PgPool,
        ministry_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM ministry_admins WHERE ministry_id = $1 ORDER BY assigned_at",
        )
        .bind(ministry_id)
        .fetch_all(pool)
        .await
    }

    /// True when the member holds an admin assignment in any ministry
    pub async fn exists_for_member(pool: &PgPool, member_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM ministry_admins WHERE member_id = $1)",
        )
        .bind(member_id)
        .fetch_one(pool)
        .await
    }

    /// Creates or re-roles an admin assignment
    pub async fn upsert(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
        role: AdminRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO ministry_admins (ministry_id, member_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (ministry_id, member_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#,
        )
        .bind(ministry_id)
        .bind(member_id)
        .bind(role.as_str())
        .fetch_one(pool)
        .await
    }

    /// Switches an existing assignment between MEMBER and LEADER. Never
    /// creates one; `None` means the member is not an admin here.
    pub async fn change_role(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
        role: AdminRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE ministry_admins
            SET role = $3
            WHERE ministry_id = $1 AND member_id = $2
            RETURNING *
            "#,
        )
        .bind(ministry_id)
        .bind(member_id)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await
    }

    pub async fn remove(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM ministry_admins WHERE ministry_id = $1 AND member_id = $2")
                .bind(ministry_id)
                .bind(member_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
