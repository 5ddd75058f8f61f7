use axum::{Json, Router, debug_handler, extract::State, routing::get};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_millis;
use crate::profiles::name::NameCache;
use crate::{AppResult, AppState};

pub(crate) const LISTED: &str = "listed";
pub(crate) const CLAIMED: &str = "claimed";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recent))
}

/// Best effort: the activity feed is decoration, a failed insert never fails
/// the action that triggered it.
pub(crate) async fn record(db_pool: &SqlitePool, user_id: Uuid, listing_id: Uuid, activity_type: &str) {
    let result = sqlx::query(
        "INSERT INTO activities (id, user_id, listing_id, activity_type, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(listing_id)
    .bind(activity_type)
    .bind(now_millis())
    .execute(db_pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(%listing_id, activity_type, error = %err, "failed to record activity");
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ActivityView {
    pub(crate) id: Uuid,
    pub(crate) user_name: String,
    pub(crate) activity_type: String,
    pub(crate) listing_id: Uuid,
    pub(crate) listing_title: String,
    pub(crate) created_at: i64,
}

#[debug_handler(state = AppState)]
pub(crate) async fn recent(
    State(db_pool): State<SqlitePool>,
    State(names): State<NameCache>,
) -> AppResult<Json<Vec<ActivityView>>> {
    let rows = recent_rows(&db_pool).await?;

    let mut feed = Vec::with_capacity(rows.len());
    for (id, user_id, activity_type, listing_id, listing_title, created_at) in rows {
        feed.push(ActivityView {
            id,
            user_name: names.resolve(&db_pool, user_id).await,
            activity_type,
            listing_id,
            listing_title,
            created_at,
        });
    }

    Ok(Json(feed))
}

type ActivityRow = (Uuid, Uuid, String, Uuid, String, i64);

pub(crate) async fn recent_rows(db_pool: &SqlitePool) -> AppResult<Vec<ActivityRow>> {
    Ok(sqlx::query_as(
        "SELECT a.id, a.user_id, a.activity_type, a.listing_id, l.title, a.created_at
         FROM activities a JOIN listings l ON l.id = a.listing_id
         ORDER BY a.created_at DESC, a.id DESC
         LIMIT 10",
    )
    .fetch_all(db_pool)
    .await?)
}
