use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub zone_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyData {
    pub name: String,
    pub address: Option<String>,
    pub zone_id: Option<Uuid>,
}

impl Family {
    pub async fn create(pool: &PgPool, data: &FamilyData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO families (name, address, zone_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.address)
        .bind(data.zone_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM families WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists families, optionally only those of one zone
    pub async fn list(pool: &PgPool, zone_id: Option<Uuid>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM families
            WHERE ($1::uuid IS NULL OR zone_id = $1)
            ORDER BY name
            "#,
        )
        .bind(zone_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &FamilyData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE families
            SET name = $2, address = $3, zone_id = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(data.zone_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM families WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts families, optionally only those of one zone
    pub async fn count(pool: &PgPool, zone_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM families
            WHERE ($1::uuid IS NULL OR zone_id = $1)
            "#,
        )
        .bind(zone_id)
        .fetch_one(pool)
        .await
    }
}

/// A dependent linked to a parent member. Children are not members.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildData {
    pub parent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl Child {
    pub async fn create(pool: &PgPool, data: &ChildData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO children (parent_id, first_name, last_name, birth_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.parent_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool, parent_id: Option<Uuid>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM children
            WHERE ($1::uuid IS NULL OR parent_id = $1)
            ORDER BY last_name, first_name
            "#,
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM children WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts children, optionally only those whose parent lives in a zone
    pub async fn count(pool: &PgPool, zone_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM children c
            INNER JOIN members m ON m.id = c.parent_id
            WHERE ($1::uuid IS NULL OR m.zone_id = $1)
            "#,
        )
        .bind(zone_id)
        .fetch_one(pool)
        .await
    }
}
