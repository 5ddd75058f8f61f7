mod claim;
mod contact;
mod new;
mod page;

use axum::{Json, Router, debug_handler, extract::{Query, State}, routing::{get, post}};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/new", post(new::new_listing))
        .route("/{id}", get(page::listing))
        .route("/{id}/claim", post(claim::claim))
        .route("/{id}/contact", post(contact::contact))
}

pub(crate) const STATUS_AVAILABLE: &str = "available";
pub(crate) const STATUS_CLAIMED: &str = "claimed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub condition: String,
    pub location: Option<String>,
    pub issues: Option<String>,
    pub status: String,
    pub created_at: i64,
}

pub(crate) const LISTING_COLUMNS: &str =
    "id, user_id, title, description, category, condition, location, issues, status, created_at";

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    category: Option<String>,
    status: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    Query(ListQuery { category, status }): Query<ListQuery>,
) -> AppResult<Json<Vec<Listing>>> {
    let status = status.unwrap_or_else(|| STATUS_AVAILABLE.to_owned());

    let listings: Vec<Listing> = match category {
        Some(category) => {
            sqlx::query_as(&format!(
                "SELECT {LISTING_COLUMNS} FROM listings
                 WHERE status = ? AND category = ?
                 ORDER BY created_at DESC, id DESC"
            ))
            .bind(&status)
            .bind(category)
            .fetch_all(&db_pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {LISTING_COLUMNS} FROM listings
                 WHERE status = ?
                 ORDER BY created_at DESC, id DESC"
            ))
            .bind(&status)
            .fetch_all(&db_pool)
            .await?
        }
    };

    Ok(Json(listings))
}

pub(crate) async fn fetch_listing(
    db_pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<Listing>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}
