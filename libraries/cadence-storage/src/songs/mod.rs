//! Song catalog queries

use cadence_core::{error::Result, AlbumId, CadenceError, CreateSong, Song, SongId, UserId};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

const SONG_COLUMNS: &str = "id, owner_id, title, duration_seconds, album_id, created_at";

pub(crate) fn from_row(row: &SqliteRow) -> Song {
    Song {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        duration_seconds: row.get("duration_seconds"),
        album_id: row.get("album_id"),
        created_at: row.get("created_at"),
    }
}

/// Create a song that belongs to no album yet
pub async fn create(pool: &SqlitePool, song: CreateSong) -> Result<Song> {
    let id = SongId::generate();

    sqlx::query("INSERT INTO songs (id, owner_id, title, duration_seconds) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&song.owner_id)
        .bind(&song.title)
        .bind(song.duration_seconds)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created song"))
}

pub async fn get_by_id(pool: &SqlitePool, id: &SongId) -> Result<Option<Song>> {
    let sql = format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(from_row))
}

/// Current album of each requested song that exists
///
/// Songs missing from the result do not exist. Order follows the database,
/// not the input.
pub async fn find_album_assignments(
    conn: &mut SqliteConnection,
    ids: &[SongId],
) -> Result<Vec<(SongId, Option<AlbumId>)>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT id, album_id FROM songs WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");

    let rows = query.build().fetch_all(&mut *conn).await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.get("id"), row.get("album_id")))
        .collect())
}

/// Delete a song owned by `user_id`
///
/// The song leaves its album and every playlist. Album and playlist keys of
/// the remaining members are left as they are; gaps do not break ordering.
pub async fn delete(pool: &SqlitePool, id: &SongId, user_id: &UserId) -> Result<()> {
    let song = get_by_id(pool, id)
        .await?
        .ok_or_else(|| CadenceError::not_found("Song", id.as_str()))?;

    if &song.owner_id != user_id {
        return Err(CadenceError::PermissionDenied);
    }

    sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
