use axum::{Json, debug_handler, extract::{Path, State}};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};

use super::name::display_name;

#[derive(Serialize)]
pub(crate) struct ProfileView {
    id: Uuid,
    display_name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    Path(user_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ProfileView>> {
    let Some((full_name,)) =
        sqlx::query_as::<_, (Option<String>,)>("SELECT full_name FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::not_found("no such profile"));
    };

    Ok(Json(ProfileView {
        id: user_id,
        display_name: display_name(full_name.as_deref(), user_id),
    }))
}
