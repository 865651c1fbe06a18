use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::{Child, Family, Member, Ministry, Zone};
use crate::services::access_gate::{self, Principal};
use crate::services::stats::{self, GlobalCounts, StatsScope, StatsSummary, ZoneCounts};

/// Church-wide dashboard
async fn admin_stats(State(state): State<AppState>) -> Result<Json<StatsSummary>> {
    let members = Member::list_all(&state.pool).await?;

    let counts = GlobalCounts {
        families: Family::count(&state.pool, None).await?,
        children: Child::count(&state.pool, None).await?,
        ministries: Ministry::count(&state.pool).await?,
        zones: Zone::count(&state.pool).await?,
        zone_rollups: Zone::rollups(&state.pool).await?,
        ministry_rollups: Ministry::rollups(&state.pool).await?,
    };

    let summary = stats::aggregate(
        &members,
        &StatsScope::Global(counts),
        Utc::now().date_naive(),
    );

    tracing::debug!(total_members = summary.total_members, "Computed global stats");

    Ok(Json(summary))
}

/// Dashboard for one zone
async fn pastor_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(zone_id): Path<Uuid>,
) -> Result<Json<StatsSummary>> {
    let zone = Zone::find_by_id(&state.pool, zone_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone not found".to_string()))?;

    access_gate::authorize_zone_stats(
        &principal,
        &zone,
        state.config.enforce_pastor_zone_ownership,
    )
    .into_result()?;

    let members = Member::list_by_zone(&state.pool, zone_id).await?;

    let counts = ZoneCounts {
        families: Family::count(&state.pool, Some(zone_id)).await?,
        children: Child::count(&state.pool, Some(zone_id)).await?,
    };

    let summary = stats::aggregate(&members, &StatsScope::Zone(counts), Utc::now().date_naive());

    tracing::debug!(
        zone_id = %zone_id,
        total_members = summary.total_members,
        "Computed zone stats"
    );

    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats/admin", get(admin_stats))
        .route("/api/stats/pastor/:zone_id", get(pastor_stats))
}
