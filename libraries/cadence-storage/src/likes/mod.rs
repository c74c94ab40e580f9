//! Song likes

use crate::songs;
use cadence_core::{error::Result, CadenceError, Song, SongId, UserId};
use sqlx::SqlitePool;

/// Like a song; liking twice is a no-op
pub async fn like_song(pool: &SqlitePool, user_id: &UserId, song_id: &SongId) -> Result<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM songs WHERE id = ?")
        .bind(song_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(CadenceError::not_found("Song", song_id.as_str()));
    }

    sqlx::query("INSERT INTO song_likes (user_id, song_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove a like; returns whether one existed
pub async fn unlike_song(pool: &SqlitePool, user_id: &UserId, song_id: &SongId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM song_likes WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Songs liked by a user, most recent first
pub async fn liked_songs(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Song>> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.owner_id, s.title, s.duration_seconds, s.album_id, s.created_at
        FROM song_likes l
        INNER JOIN songs s ON s.id = l.song_id
        WHERE l.user_id = ?
        ORDER BY l.liked_at DESC, s.title
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(songs::from_row).collect())
}

pub async fn like_count(pool: &SqlitePool, song_id: &SongId) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM song_likes WHERE song_id = ?")
        .bind(song_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
