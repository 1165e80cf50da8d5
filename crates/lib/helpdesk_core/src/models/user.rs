//! Employee account domain models.

/// Employee account row as listed by the user surface.
///
/// The stored credential is deliberately never carried on this type; only
/// `users::queries::insert_user` touches the `password` column.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
