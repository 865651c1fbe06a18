use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use super::{Member, MinistryMember};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
        }
    }
}

/// A pending request for a member to join a ministry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MinistryRequest {
    pub id: Uuid,
    pub ministry_id: Uuid,
    pub member_id: Uuid,
    pub requested_by: Option<Uuid>,
    pub status: String, // "PENDING", "APPROVED", "REJECTED"
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MinistryRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending.as_str()
    }

    pub async fn create(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
        requested_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO ministry_requests (ministry_id, member_id, requested_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(ministry_id)
        .bind(member_id)
        .bind(requested_by)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM ministry_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// An open request for the same member and ministry, if any
    pub async fn find_pending(
        pool: &PgPool,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM ministry_requests
            WHERE ministry_id = $1 AND member_id = $2 AND status = 'PENDING'
            "#,
        )
        .bind(ministry_id)
        .bind(member_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_pending(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM ministry_requests
            WHERE status = 'PENDING'
            ORDER BY created_at
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Records the review outcome of a pending request
    pub async fn review<'e, E>(
        executor: E,
        id: Uuid,
        status: RequestStatus,
        reviewed_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE ministry_requests
            SET status = $2, reviewed_by = $3, reviewed_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(reviewed_by)
        .fetch_optional(executor)
        .await
    }

    /// Approves a pending request, joins the member to the ministry and makes
    /// it their current one, all in one transaction. `None` when the request
    /// was no longer pending.
    pub async fn approve(
        pool: &PgPool,
        id: Uuid,
        reviewed_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(request) =
            Self::review(&mut *tx, id, RequestStatus::Approved, reviewed_by).await?
        else {
            return Ok(None);
        };

        MinistryMember::add(&mut *tx, request.ministry_id, request.member_id).await?;
        Member::set_current_ministry(&mut *tx, request.member_id, Some(request.ministry_id))
            .await?;

        tx.commit().await?;

        Ok(Some(request))
    }
}
