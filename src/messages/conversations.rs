use std::collections::HashMap;
use std::collections::hash_map::Entry;

use axum::{Json, debug_handler, extract::State};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::profiles::name::NameCache;
use crate::{AppResult, AppState, session};

use super::{MESSAGE_COLUMNS, Message};

/// One inbox entry: the other participant and the listing they are talking
/// about. Derived from the message table on every load, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub other_user_id: Uuid,
    pub listing_id: Uuid,
    pub counterparty_name: String,
    pub last_message: Message,
    pub unread_count: u32,
}

/// Signed out means an empty inbox, not an error. Any fetch error fails the
/// whole aggregation so the caller never renders a partial inbox.
#[debug_handler(state = AppState)]
pub(crate) async fn conversations(
    State(db_pool): State<SqlitePool>,
    State(names): State<NameCache>,
    session: Session,
) -> AppResult<Json<Vec<Conversation>>> {
    let Some(me) = session::maybe_user(&session).await? else {
        return Ok(Json(Vec::new()));
    };

    let mut grouped = load_conversations(&db_pool, me).await?;
    for conversation in &mut grouped {
        conversation.counterparty_name = names.resolve(&db_pool, conversation.other_user_id).await;
    }

    Ok(Json(grouped))
}

pub(crate) async fn load_conversations(
    db_pool: &SqlitePool,
    me: Uuid,
) -> AppResult<Vec<Conversation>> {
    let newest_first: Vec<Message> = sqlx::query_as(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE sender_id = ? OR recipient_id = ?
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(me)
    .bind(me)
    .fetch_all(db_pool)
    .await?;

    Ok(group_conversations(me, &newest_first))
}

/// Fold a newest-first message list into conversation summaries. The first
/// message seen per (counterparty, listing) key is the representative, so the
/// output keeps most-recently-active-first order.
pub fn group_conversations(me: Uuid, newest_first: &[Message]) -> Vec<Conversation> {
    let mut index: HashMap<(Uuid, Uuid), usize> = HashMap::new();
    let mut grouped: Vec<Conversation> = Vec::new();

    for message in newest_first {
        let other = if message.sender_id == me {
            message.recipient_id
        } else {
            message.sender_id
        };
        let unread = u32::from(message.recipient_id == me && !message.read);

        match index.entry((other, message.listing_id)) {
            Entry::Occupied(entry) => grouped[*entry.get()].unread_count += unread,
            Entry::Vacant(entry) => {
                entry.insert(grouped.len());
                grouped.push(Conversation {
                    other_user_id: other,
                    listing_id: message.listing_id,
                    counterparty_name: String::new(),
                    last_message: message.clone(),
                    unread_count: unread,
                });
            }
        }
    }

    grouped
}
