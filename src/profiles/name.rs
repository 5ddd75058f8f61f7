use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Display name from a profile's full name: first name plus last initial.
/// Users without a name on file get a stable label derived from their id.
/// Every surface that shows a user goes through this, so one user reads the
/// same everywhere.
pub fn display_name(full_name: Option<&str>, user_id: Uuid) -> String {
    let full_name = full_name.map(str::trim).unwrap_or_default();
    let mut tokens = full_name.split_whitespace();

    let Some(first) = tokens.next() else {
        return format!("User {}", &user_id.simple().to_string()[..8]);
    };

    match tokens.last().and_then(|last| last.chars().next()) {
        Some(initial) => format!("{first} {initial}."),
        None => first.to_owned(),
    }
}

/// Memoizes id → display name for the life of the process. Full names rarely
/// change mid-session, so there is no invalidation.
#[derive(Clone, Default)]
pub struct NameCache(Arc<Mutex<HashMap<Uuid, String>>>);

impl NameCache {
    pub async fn resolve(&self, db_pool: &SqlitePool, user_id: Uuid) -> String {
        if let Some(name) = self.0.lock().await.get(&user_id) {
            return name.clone();
        }

        let row: Result<Option<(Option<String>,)>, sqlx::Error> =
            sqlx::query_as("SELECT full_name FROM profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(db_pool)
                .await;

        match row {
            Ok(row) => {
                let name = display_name(row.and_then(|(full_name,)| full_name).as_deref(), user_id);
                self.0.lock().await.insert(user_id, name.clone());
                name
            }
            Err(err) => {
                // leave uncached so the next lookup can retry
                tracing::warn!(%user_id, error = %err, "profile lookup failed");
                display_name(None, user_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;
    use uuid::Uuid;

    use crate::testutil;

    use super::{NameCache, display_name};

    #[test]
    fn first_name_and_last_initial() {
        let id = Uuid::from_u128(7);
        assert_eq!(display_name(Some("Jane Doe"), id), "Jane D.");
        assert_eq!(display_name(Some("Mary Jane Watson"), id), "Mary W.");
        assert_eq!(display_name(Some("  Jane   Doe  "), id), "Jane D.");
    }

    #[test]
    fn single_names_pass_through() {
        assert_eq!(display_name(Some("Cher"), Uuid::from_u128(7)), "Cher");
    }

    #[test]
    fn missing_names_fall_back_to_a_stable_label() {
        let id = Uuid::from_u128(0xdead_beef);
        let label = display_name(None, id);
        assert!(label.starts_with("User "));
        assert_eq!(label, display_name(Some("   "), id));
    }

    #[sqlx::test]
    async fn resolves_through_the_cache(pool: SqlitePool) {
        let names = NameCache::default();
        let user = testutil::profile(&pool, Some("Devin Ortiz")).await;

        assert_eq!(names.resolve(&pool, user).await, "Devin O.");

        // cached: a later rename is not picked up within the session
        sqlx::query("UPDATE profiles SET full_name = 'Someone Else' WHERE id = ?")
            .bind(user)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(names.resolve(&pool, user).await, "Devin O.");
    }

    #[sqlx::test]
    async fn unknown_users_resolve_to_the_fallback(pool: SqlitePool) {
        let names = NameCache::default();
        let ghost = Uuid::from_u128(42);
        assert!(names.resolve(&pool, ghost).await.starts_with("User "));
    }
}
