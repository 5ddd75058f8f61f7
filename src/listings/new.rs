use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::db::now_millis;
use crate::{AppError, AppResult, AppState, activities, session};

use super::{Listing, STATUS_AVAILABLE};

#[derive(Debug, Deserialize)]
pub(crate) struct NewListing {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category: String,
    pub(crate) condition: String,
    pub(crate) location: Option<String>,
    pub(crate) issues: Option<String>,
    /// Storage paths of already-uploaded photos, in display order.
    #[serde(default)]
    pub(crate) images: Vec<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_listing(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(request): Json<NewListing>,
) -> AppResult<Json<Listing>> {
    let me = session::current_user(&session).await?;
    let listing = create_listing(&db_pool, me, request).await?;
    Ok(Json(listing))
}

pub(crate) async fn create_listing(
    db_pool: &SqlitePool,
    owner: Uuid,
    request: NewListing,
) -> AppResult<Listing> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("listing title must not be empty"));
    }
    if request.category.trim().is_empty() || request.condition.trim().is_empty() {
        return Err(AppError::bad_request("category and condition are required"));
    }

    let listing = Listing {
        id: Uuid::now_v7(),
        user_id: owner,
        title: title.to_owned(),
        description: request.description,
        category: request.category,
        condition: request.condition,
        location: request.location,
        issues: request.issues,
        status: STATUS_AVAILABLE.to_owned(),
        created_at: now_millis(),
    };

    sqlx::query(
        "INSERT INTO listings (id, user_id, title, description, category, condition, location, issues, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(listing.id)
    .bind(listing.user_id)
    .bind(&listing.title)
    .bind(&listing.description)
    .bind(&listing.category)
    .bind(&listing.condition)
    .bind(&listing.location)
    .bind(&listing.issues)
    .bind(&listing.status)
    .bind(listing.created_at)
    .execute(db_pool)
    .await?;

    for (order_index, storage_path) in request.images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO listing_images (id, listing_id, storage_path, order_index)
             VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7())
        .bind(listing.id)
        .bind(storage_path)
        .bind(order_index as i64)
        .execute(db_pool)
        .await?;
    }

    activities::record(db_pool, owner, listing.id, activities::LISTED).await;

    tracing::info!(listing_id = %listing.id, title = %listing.title, "listing created");

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use crate::testutil;

    use super::{NewListing, create_listing};

    fn request(title: &str) -> NewListing {
        NewListing {
            title: title.to_owned(),
            description: Some("4K, HDMI and DisplayPort inputs.".to_owned()),
            category: "monitors".to_owned(),
            condition: "Working".to_owned(),
            location: Some("West Harlem".to_owned()),
            issues: None,
            images: vec!["monitor/front.jpg".to_owned(), "monitor/back.jpg".to_owned()],
        }
    }

    #[sqlx::test]
    async fn creates_listing_with_ordered_images_and_activity(pool: SqlitePool) {
        let owner = testutil::profile(&pool, None).await;

        let listing = create_listing(&pool, owner, request("Dell Monitor 27\"")).await.unwrap();
        assert_eq!(listing.status, "available");

        let images: Vec<(String, i64)> = sqlx::query_as(
            "SELECT storage_path, order_index FROM listing_images WHERE listing_id = ? ORDER BY order_index",
        )
        .bind(listing.id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            images,
            [("monitor/front.jpg".to_owned(), 0), ("monitor/back.jpg".to_owned(), 1)]
        );

        let (activity_type,): (String,) =
            sqlx::query_as("SELECT activity_type FROM activities WHERE listing_id = ?")
                .bind(listing.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(activity_type, "listed");
    }

    #[sqlx::test]
    async fn blank_titles_are_rejected(pool: SqlitePool) {
        let owner = testutil::profile(&pool, None).await;
        let err = create_listing(&pool, owner, request("   ")).await.unwrap_err();
        assert_eq!(err.0, axum::http::StatusCode::BAD_REQUEST);
    }
}
