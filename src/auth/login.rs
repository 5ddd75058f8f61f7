use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::db::now_millis;
use crate::profiles::name::display_name;
use crate::{AppResult, AppState, session};

use super::SessionUser;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) user_id: Option<Uuid>,
    pub(crate) full_name: Option<String>,
}

/// Identity arrives from the hosted auth provider; this endpoint takes the
/// handoff, keeps the profile row in step and opens the session. First-time
/// sign-ins create the profile row, carrying the full name from the signup
/// form when one was given.
#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<SessionUser>> {
    let user_id = request.user_id.unwrap_or_else(Uuid::now_v7);
    let full_name = request
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    upsert_profile(&db_pool, user_id, full_name).await?;
    session.insert(session::USER_ID, user_id).await?;

    let (full_name,): (Option<String>,) =
        sqlx::query_as("SELECT full_name FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_one(&db_pool)
            .await?;

    tracing::info!(%user_id, "signed in");

    Ok(Json(SessionUser {
        user_id,
        display_name: display_name(full_name.as_deref(), user_id),
    }))
}

pub(crate) async fn upsert_profile(
    db_pool: &SqlitePool,
    user_id: Uuid,
    full_name: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (id, full_name, created_at) VALUES (?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             full_name = COALESCE(excluded.full_name, profiles.full_name)",
    )
    .bind(user_id)
    .bind(full_name)
    .bind(now_millis())
    .execute(db_pool)
    .await?;
    Ok(())
}
