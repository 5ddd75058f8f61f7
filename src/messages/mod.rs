pub mod conversations;
pub(crate) mod send;
mod thread;
mod ws;

use axum::{Router, routing::{get, post}};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conversations::conversations))
        .route("/send", post(send::send))
        .route("/{other_id}/{listing_id}", get(thread::thread))
        .route("/{other_id}/{listing_id}/ws", get(ws::thread_ws))
}

/// A message row. Immutable once written, except `read` which flips to true
/// when the recipient loads the thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub listing_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: i64,
}

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, sender_id, recipient_id, listing_id, content, read, created_at";

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;
    use tokio::sync::broadcast;

    use crate::testutil;

    use super::conversations::load_conversations;
    use super::send::{SendMessage, persist_message};
    use super::thread::load_thread;
    use super::ws;

    // A buyer contacts an owner, the owner reads and replies, and the buyer's
    // live subscription sees the reply without a reload.
    #[sqlx::test]
    async fn interested_buyer_round_trip(pool: SqlitePool) {
        let (feed, _keep_open) = broadcast::channel(16);
        let buyer = testutil::profile(&pool, Some("Xiomara Quinn")).await;
        let owner = testutil::profile(&pool, Some("Yusuf Reyes")).await;
        let macbook = testutil::listing(&pool, owner, "MacBook Pro 2019").await;

        let opener = persist_message(
            &pool,
            &feed,
            buyer,
            SendMessage {
                recipient_id: owner,
                listing_id: macbook,
                content: "Hi! I'm interested in your MacBook Pro 2019.".to_owned(),
            },
        )
        .await
        .unwrap();
        assert!(!opener.read);

        let inbox = load_conversations(&pool, owner).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].other_user_id, buyer);
        assert_eq!(inbox[0].listing_id, macbook);
        assert_eq!(inbox[0].unread_count, 1);
        assert_eq!(inbox[0].last_message.content, opener.content);

        // opening the thread clears the unread badge
        let thread = load_thread(&pool, owner, buyer, macbook).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert!(thread[0].read);
        let inbox = load_conversations(&pool, owner).await.unwrap();
        assert_eq!(inbox[0].unread_count, 0);

        // the buyer's open subscription receives the reply
        let mut rx = feed.subscribe();
        let reply = persist_message(
            &pool,
            &feed,
            owner,
            SendMessage {
                recipient_id: buyer,
                listing_id: macbook,
                content: "Still available".to_owned(),
            },
        )
        .await
        .unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event, reply);
        assert!(ws::belongs_to_thread(&event, buyer, owner, macbook));
    }

    // The same pair talking about two listings stays two conversations.
    #[sqlx::test]
    async fn listings_keep_conversations_apart(pool: SqlitePool) {
        let (feed, _keep_open) = broadcast::channel(16);
        let buyer = testutil::profile(&pool, None).await;
        let owner = testutil::profile(&pool, None).await;
        let macbook = testutil::listing(&pool, owner, "MacBook Pro 2019").await;
        let monitor = testutil::listing(&pool, owner, "Dell Monitor 27\"").await;

        for listing in [macbook, monitor] {
            persist_message(
                &pool,
                &feed,
                buyer,
                SendMessage {
                    recipient_id: owner,
                    listing_id: listing,
                    content: "Is this still around?".to_owned(),
                },
            )
            .await
            .unwrap();
        }

        let inbox = load_conversations(&pool, owner).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_ne!(inbox[0].listing_id, inbox[1].listing_id);

        // one thread load only touches its own conversation's unread state
        load_thread(&pool, owner, buyer, macbook).await.unwrap();
        let inbox = load_conversations(&pool, owner).await.unwrap();
        let by_listing = |id| {
            inbox
                .iter()
                .find(|c| c.listing_id == id)
                .map(|c| c.unread_count)
                .unwrap()
        };
        assert_eq!(by_listing(macbook), 0);
        assert_eq!(by_listing(monitor), 1);
    }

    #[sqlx::test]
    async fn empty_inbox_is_not_an_error(pool: SqlitePool) {
        let nobody = testutil::profile(&pool, None).await;
        let inbox = load_conversations(&pool, nobody).await.unwrap();
        assert!(inbox.is_empty());
    }
}
