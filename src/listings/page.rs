use axum::{Json, debug_handler, extract::{Path, State}};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::profiles::name::NameCache;
use crate::{AppError, AppResult, AppState};

use super::{Listing, fetch_listing};

#[derive(Serialize)]
pub(crate) struct ListingDetail {
    #[serde(flatten)]
    listing: Listing,
    owner_name: String,
    /// Object-store paths, in gallery order.
    images: Vec<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn listing(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(names): State<NameCache>,
) -> AppResult<Json<ListingDetail>> {
    let Some(listing) = fetch_listing(&db_pool, id).await? else {
        return Err(AppError::not_found("no such listing"));
    };

    let images: Vec<(String,)> = sqlx::query_as(
        "SELECT storage_path FROM listing_images WHERE listing_id = ? ORDER BY order_index",
    )
    .bind(id)
    .fetch_all(&db_pool)
    .await?;

    let owner_name = names.resolve(&db_pool, listing.user_id).await;

    Ok(Json(ListingDetail {
        listing,
        owner_name,
        images: images.into_iter().map(|(path,)| path).collect(),
    }))
}
