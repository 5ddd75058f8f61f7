use axum::{Json, debug_handler, extract::{Path, State}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState, activities, session};

use super::{Listing, STATUS_AVAILABLE, STATUS_CLAIMED, fetch_listing};

#[debug_handler(state = AppState)]
pub(crate) async fn claim(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Listing>> {
    let me = session::current_user(&session).await?;
    Ok(Json(claim_listing(&db_pool, me, id).await?))
}

pub(crate) async fn claim_listing(
    db_pool: &SqlitePool,
    me: Uuid,
    id: Uuid,
) -> AppResult<Listing> {
    let Some(listing) = fetch_listing(db_pool, id).await? else {
        return Err(AppError::not_found("no such listing"));
    };

    if listing.user_id == me {
        return Err(AppError::bad_request("you cannot claim your own listing"));
    }

    // the status guard makes two racing claims settle on one winner
    let updated = sqlx::query("UPDATE listings SET status = ? WHERE id = ? AND status = ?")
        .bind(STATUS_CLAIMED)
        .bind(id)
        .bind(STATUS_AVAILABLE)
        .execute(db_pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::bad_request("this item is no longer available"));
    }

    activities::record(db_pool, me, id, activities::CLAIMED).await;

    tracing::info!(listing_id = %id, claimed_by = %me, "listing claimed");

    Ok(Listing { status: STATUS_CLAIMED.to_owned(), ..listing })
}
