use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::db::now_millis;
use crate::{AppError, AppResult, AppState, session};

use super::Message;

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessage {
    pub(crate) recipient_id: Uuid,
    pub(crate) listing_id: Uuid,
    pub(crate) content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    State(feed): State<broadcast::Sender<Message>>,
    session: Session,
    Json(outbound): Json<SendMessage>,
) -> AppResult<Json<Message>> {
    let me = session::current_user(&session).await?;
    let message = persist_message(&db_pool, &feed, me, outbound).await?;
    Ok(Json(message))
}

/// Validates, persists and publishes one outbound message. Validation happens
/// before any store interaction; the feed only ever sees rows that were
/// actually inserted.
pub(crate) async fn persist_message(
    db_pool: &SqlitePool,
    feed: &broadcast::Sender<Message>,
    sender_id: Uuid,
    SendMessage { recipient_id, listing_id, content }: SendMessage,
) -> AppResult<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("message content must not be empty"));
    }
    if recipient_id == sender_id {
        return Err(AppError::bad_request("cannot send a message to yourself"));
    }

    if sqlx::query_as::<_, (i64,)>("SELECT 1 FROM listings WHERE id = ?")
        .bind(listing_id)
        .fetch_optional(db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::bad_request("no such listing"));
    }

    let message = Message {
        id: Uuid::now_v7(),
        sender_id,
        recipient_id,
        listing_id,
        content: content.to_owned(),
        read: false,
        created_at: now_millis(),
    };

    sqlx::query(
        "INSERT INTO messages (id, sender_id, recipient_id, listing_id, content, read, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(message.id)
    .bind(message.sender_id)
    .bind(message.recipient_id)
    .bind(message.listing_id)
    .bind(&message.content)
    .bind(message.read)
    .bind(message.created_at)
    .execute(db_pool)
    .await?;

    tracing::debug!(message_id = %message.id, %listing_id, "message sent");

    // nobody listening is fine
    let _ = feed.send(message.clone());

    Ok(message)
}
