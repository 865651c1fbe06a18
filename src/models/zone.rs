use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub pastor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneData {
    pub name: String,
    pub description: Option<String>,
    pub pastor_id: Option<Uuid>,
}

/// Member and family counts for one zone, in store order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRollup {
    pub zone_id: Uuid,
    pub name: String,
    pub member_count: i64,
    pub family_count: i64,
}

impl Zone {
    pub async fn create(pool: &PgPool, data: &ZoneData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO zones (name, description, pastor_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.pastor_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM zones WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM zones ORDER BY created_at")
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &ZoneData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE zones
            SET name = $2, description = $3, pastor_id = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.pastor_id)
        .fetch_optional(pool)
        .await
    }

    /// Hands the zone to a new pastor. Members keep their zone assignment.
    pub async fn assign_pastor(
        pool: &PgPool,
        id: Uuid,
        pastor_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE zones
            SET pastor_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(pastor_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM zones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM zones")
            .fetch_one(pool)
            .await
    }

    /// Per-zone member and family counts for the admin dashboard
    pub async fn rollups(pool: &PgPool) -> Result<Vec<ZoneRollup>, sqlx::Error> {
        sqlx::query_as::<_, ZoneRollup>(
            r#"
            SELECT
                z.id AS zone_id,
                z.name,
                (SELECT COUNT(*) FROM members m WHERE m.zone_id = z.id) AS member_count,
                (SELECT COUNT(*) FROM families f WHERE f.zone_id = z.id) AS family_count
            FROM zones z
            ORDER BY z.created_at
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
