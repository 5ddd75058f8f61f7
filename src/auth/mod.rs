mod login;
mod logout;

use axum::{Json, Router, debug_handler, extract::State, routing::{get, post}};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::profiles::name::display_name;
use crate::{AppError, AppResult, AppState, session};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/me", get(me))
}

#[derive(Serialize)]
pub(crate) struct SessionUser {
    pub(crate) user_id: Uuid,
    pub(crate) display_name: String,
}

#[debug_handler(state = AppState)]
async fn me(State(db_pool): State<SqlitePool>, session: Session) -> AppResult<Json<SessionUser>> {
    let user_id = session::current_user(&session).await?;

    let Some((full_name,)) =
        sqlx::query_as::<_, (Option<String>,)>("SELECT full_name FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::not_found("no such profile"));
    };

    Ok(Json(SessionUser {
        user_id,
        display_name: display_name(full_name.as_deref(), user_id),
    }))
}
