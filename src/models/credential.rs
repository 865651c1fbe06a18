use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::services::credentials::HashedSecret;

/// Login secret for a member. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub member_id: Uuid,
    pub password_hash: String,
    pub salt: String,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn hashed(&self) -> HashedSecret {
        HashedSecret {
            salt: self.salt.clone(),
            hash: self.password_hash.clone(),
        }
    }

    /// Stores (or replaces) the member's login secret
    pub async fn set(
        pool: &PgPool,
        member_id: Uuid,
        secret: &HashedSecret,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO credentials (member_id, password_hash, salt)
            VALUES ($1, $2, $3)
            ON CONFLICT (member_id) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                salt = EXCLUDED.salt,
                updated_at = NOW()
            "#,
        )
        .bind(member_id)
        .bind(&secret.hash)
        .bind(&secret.salt)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_member_id(
        pool: &PgPool,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM credentials WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn any_exist(pool: &PgPool) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM credentials)")
            .fetch_one(pool)
            .await
    }
}
