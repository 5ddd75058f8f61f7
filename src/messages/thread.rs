use axum::{Json, debug_handler, extract::{Path, State}};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, AppState, session};

use super::{MESSAGE_COLUMNS, Message};

/// Chronological history for one conversation. Loading it marks everything
/// addressed to the caller as read; re-loading is a no-op on read state.
#[debug_handler(state = AppState)]
pub(crate) async fn thread(
    Path((other_id, listing_id)): Path<(Uuid, Uuid)>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<Message>>> {
    let me = session::current_user(&session).await?;
    Ok(Json(load_thread(&db_pool, me, other_id, listing_id).await?))
}

pub(crate) async fn load_thread(
    db_pool: &SqlitePool,
    me: Uuid,
    other_id: Uuid,
    listing_id: Uuid,
) -> AppResult<Vec<Message>> {
    let mut thread: Vec<Message> = sqlx::query_as(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE listing_id = ?
           AND ((sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?))
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(listing_id)
    .bind(me)
    .bind(other_id)
    .bind(other_id)
    .bind(me)
    .fetch_all(db_pool)
    .await?;

    let unread: Vec<Uuid> = thread
        .iter()
        .filter(|m| m.recipient_id == me && !m.read)
        .map(|m| m.id)
        .collect();

    // A mark-read failure never blocks showing the thread; the next load
    // retries it.
    if !unread.is_empty() {
        match mark_read(db_pool, &unread).await {
            Ok(()) => {
                for message in &mut thread {
                    if message.recipient_id == me {
                        message.read = true;
                    }
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to mark thread read"),
        }
    }

    Ok(thread)
}

async fn mark_read(db_pool: &SqlitePool, ids: &[Uuid]) -> Result<(), sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("UPDATE messages SET read = TRUE WHERE id IN (");
    let mut in_list = query.separated(", ");
    for id in ids {
        in_list.push_bind(*id);
    }
    query.push(")");
    query.build().execute(db_pool).await?;
    Ok(())
}
