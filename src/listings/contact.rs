use axum::{Json, debug_handler, extract::{Path, State}};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::messages::Message;
use crate::messages::send::{SendMessage, persist_message};
use crate::{AppError, AppResult, AppState, session};

use super::fetch_listing;

/// "Contact owner" on a listing page: opens the conversation with a default
/// note about the item. Composer rules apply, so contacting your own listing
/// is rejected.
#[debug_handler(state = AppState)]
pub(crate) async fn contact(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(feed): State<broadcast::Sender<Message>>,
    session: Session,
) -> AppResult<Json<Message>> {
    let me = session::current_user(&session).await?;
    Ok(Json(contact_owner(&db_pool, &feed, me, id).await?))
}

pub(crate) async fn contact_owner(
    db_pool: &SqlitePool,
    feed: &broadcast::Sender<Message>,
    me: Uuid,
    listing_id: Uuid,
) -> AppResult<Message> {
    let Some(listing) = fetch_listing(db_pool, listing_id).await? else {
        return Err(AppError::not_found("no such listing"));
    };

    persist_message(
        db_pool,
        feed,
        me,
        SendMessage {
            recipient_id: listing.user_id,
            listing_id,
            content: format!("Hi! I'm interested in your {}.", listing.title),
        },
    )
    .await
}
