//! User account queries

use cadence_core::{error::Result, CadenceError, CreateUser, User, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }
}

/// Create a user with a generated ID
///
/// A taken username surfaces as [`CadenceError::Conflict`].
pub async fn create(pool: &SqlitePool, user: CreateUser) -> Result<User> {
    let id = UserId::generate();

    sqlx::query("INSERT INTO users (id, username) VALUES (?, ?)")
        .bind(&id)
        .bind(&user.username)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created user"))
}

pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, created_at FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Get all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT id, username, created_at FROM users ORDER BY username")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(from_row).collect())
}
