//! User-related database queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::UserError;
use crate::models::user::UserRecord;

/// All users ordered by id. The password column is never selected.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRecord>, UserError> {
    let rows = sqlx::query_as::<_, (i32, String, String, String, DateTime<Utc>)>(
        "SELECT id, username, role, status, created_at \
         FROM users \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, username, role, status, created_at)| UserRecord {
            id,
            username,
            role,
            status,
            created_at,
        })
        .collect())
}

/// Insert a user row, returning the new user id.
pub async fn insert_user(
    pool: &PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> Result<i32, UserError> {
    let user_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO users (username, password, role) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(username)
    .bind(password)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(user_id)
}

/// Set one user's status. A missing user id is not an error.
pub async fn update_status(pool: &PgPool, user_id: i32, status: &str) -> Result<(), UserError> {
    sqlx::query("UPDATE users SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
