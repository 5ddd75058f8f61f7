use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_millis;
use crate::messages::Message;

pub(crate) async fn profile(db_pool: &SqlitePool, full_name: Option<&str>) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO profiles (id, full_name, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(full_name)
        .bind(now_millis())
        .execute(db_pool)
        .await
        .expect("insert profile");
    id
}

pub(crate) async fn listing(db_pool: &SqlitePool, owner: Uuid, title: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO listings (id, user_id, title, category, condition, status, created_at)
         VALUES (?, ?, ?, 'laptops', 'Working', 'available', ?)",
    )
    .bind(id)
    .bind(owner)
    .bind(title)
    .bind(now_millis())
    .execute(db_pool)
    .await
    .expect("insert listing");
    id
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn message(
    db_pool: &SqlitePool,
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    listing_id: Uuid,
    content: &str,
    read: bool,
    created_at: i64,
) {
    sqlx::query(
        "INSERT INTO messages (id, sender_id, recipient_id, listing_id, content, read, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(sender_id)
    .bind(recipient_id)
    .bind(listing_id)
    .bind(content)
    .bind(read)
    .bind(created_at)
    .execute(db_pool)
    .await
    .expect("insert message");
}

pub(crate) fn mem_message(
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    listing_id: Uuid,
    content: &str,
    read: bool,
    created_at: i64,
) -> Message {
    Message {
        id,
        sender_id,
        recipient_id,
        listing_id,
        content: content.to_owned(),
        read,
        created_at,
    }
}
