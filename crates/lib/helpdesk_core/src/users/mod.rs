//! Employee account management.

pub mod queries;

use sqlx::PgPool;
use thiserror::Error;

use crate::models::user::UserRecord;

/// Errors from user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// All employee accounts, ordered by id ascending.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRecord>, UserError> {
    queries::list_users(pool).await
}

/// Create an employee account. Returns the new user id.
///
/// The credential is stored exactly as supplied; hashing is the integrating
/// system's concern. Username uniqueness is enforced by the store.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> Result<i32, UserError> {
    let user_id = queries::insert_user(pool, username, password, role).await?;
    Ok(user_id)
}

/// Update one employee's status column. No other field is updatable through
/// this path.
pub async fn set_status(pool: &PgPool, user_id: i32, status: &str) -> Result<(), UserError> {
    queries::update_status(pool, user_id, status).await
}
