use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult};

pub const USER_ID: &str = "user_id";

pub async fn maybe_user(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(USER_ID).await?)
}

/// The signed-in user, or a 401 telling the caller to sign in.
pub async fn current_user(session: &Session) -> AppResult<Uuid> {
    maybe_user(session).await?.ok_or_else(AppError::sign_in_required)
}
