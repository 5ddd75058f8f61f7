use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await?;

    sqlx::migrate!().run(&db_pool).await?;

    Ok(db_pool)
}

/// Row timestamps are unix-epoch milliseconds. Ordering ties are broken by
/// the uuid-v7 row id, which follows creation time.
pub(crate) fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
