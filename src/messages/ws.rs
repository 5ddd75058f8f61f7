use std::collections::HashSet;

use axum::{
    debug_handler,
    extract::{Path, State, WebSocketUpgrade, ws::WebSocket},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, session};

use super::Message;
use super::send::{SendMessage, persist_message};

/// Live updates for one open conversation. The connection owns its feed
/// receiver, so closing the socket releases the subscription.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn thread_ws(
    Path((other_id, listing_id)): Path<(Uuid, Uuid)>,
    State(db_pool): State<SqlitePool>,
    State(feed): State<broadcast::Sender<Message>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let me = session::current_user(&session).await?;

    Ok(ws.on_upgrade(move |socket| thread_feed(socket, db_pool, feed, me, other_id, listing_id)))
}

#[derive(Deserialize)]
struct ComposeFrame {
    content: String,
}

async fn thread_feed(
    socket: WebSocket,
    db_pool: SqlitePool,
    feed: broadcast::Sender<Message>,
    me: Uuid,
    other_id: Uuid,
    listing_id: Uuid,
) {
    let mut rx = feed.subscribe();
    let (mut sink, mut source) = socket.split();

    let forward_task = tokio::spawn(async move {
        let mut seen = HashSet::new();
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !should_forward(&event, me, other_id, listing_id, &mut seen) {
                        continue;
                    }
                    let Ok(frame) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sink.send(frame.into()).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // missed events show up on the next thread reload
                    tracing::warn!(skipped, "thread subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // inbound frames compose into the open conversation
    while let Some(Ok(frame)) = source.next().await {
        let Ok(compose) = serde_json::from_slice::<ComposeFrame>(&frame.into_data()) else {
            continue;
        };

        let outbound = SendMessage {
            recipient_id: other_id,
            listing_id,
            content: compose.content,
        };
        if let Err(err) = persist_message(&db_pool, &feed, me, outbound).await {
            tracing::warn!(error = %err, "dropping rejected websocket message");
        }
    }

    forward_task.abort();
}

/// An event reaches the client iff it belongs to the open conversation and
/// has not been delivered on this connection before, so a sender's own echo
/// shows up exactly once.
pub(crate) fn should_forward(
    event: &Message,
    me: Uuid,
    other_id: Uuid,
    listing_id: Uuid,
    seen: &mut HashSet<Uuid>,
) -> bool {
    belongs_to_thread(event, me, other_id, listing_id) && seen.insert(event.id)
}

pub(crate) fn belongs_to_thread(event: &Message, me: Uuid, other_id: Uuid, listing_id: Uuid) -> bool {
    event.listing_id == listing_id
        && ((event.sender_id == me && event.recipient_id == other_id)
            || (event.sender_id == other_id && event.recipient_id == me))
}
