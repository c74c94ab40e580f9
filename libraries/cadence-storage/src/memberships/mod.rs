//! Membership store: "container holds song at order key K"
//!
//! Thin accessor over the two membership relations. Album membership lives on
//! the song row (`songs.album_id`, `songs.album_position`); playlist membership
//! lives in `playlist_songs`. Every function takes the open transaction's
//! connection so callers group multi-row changes atomically. No ordering
//! policy lives here.
//!
//! Keys are unique per container at all times. Renumbering goes through two
//! phases to respect that: rows are first *parked* at `-(final) - 1` (persisted
//! keys are never negative, so parked values cannot collide with live ones),
//! then [`settle_parked`] flips every parked row to its final key.

use cadence_core::{error::Result, CadenceError, ContainerKind, ContainerRef, OrderKey, OrderedSong, SongId};
use sqlx::{Row, SqliteConnection};

/// One membership row, as seen by the reorder engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub song_id: SongId,
    pub order_key: OrderKey,
}

/// Table and column names backing a container kind
struct Relation {
    table: &'static str,
    container: &'static str,
    song: &'static str,
    key: &'static str,
}

const ALBUM: Relation = Relation {
    table: "songs",
    container: "album_id",
    song: "id",
    key: "album_position",
};

const PLAYLIST: Relation = Relation {
    table: "playlist_songs",
    container: "playlist_id",
    song: "song_id",
    key: "position",
};

fn relation(container: &ContainerRef) -> &'static Relation {
    match container.kind() {
        ContainerKind::Album => &ALBUM,
        ContainerKind::Playlist => &PLAYLIST,
    }
}

/// Current members ordered by ascending key
pub async fn list_ordered(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
) -> Result<Vec<Membership>> {
    let rel = relation(container);
    let sql = format!(
        "SELECT {song} AS song_id, {key} AS order_key FROM {table}
         WHERE {container} = ? ORDER BY {key}",
        song = rel.song,
        key = rel.key,
        table = rel.table,
        container = rel.container,
    );

    let rows = sqlx::query(&sql)
        .bind(container.id_str())
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Membership {
            song_id: row.get("song_id"),
            order_key: row.get("order_key"),
        })
        .collect())
}

/// Members joined with song details, with their derived display index
pub async fn list_songs(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
) -> Result<Vec<OrderedSong>> {
    let sql = match container.kind() {
        ContainerKind::Album => {
            "SELECT s.id AS song_id, s.title, s.album_position AS order_key
             FROM songs s
             WHERE s.album_id = ?
             ORDER BY s.album_position"
        }
        ContainerKind::Playlist => {
            "SELECT ps.song_id, s.title, ps.position AS order_key
             FROM playlist_songs ps
             INNER JOIN songs s ON s.id = ps.song_id
             WHERE ps.playlist_id = ?
             ORDER BY ps.position"
        }
    };

    let rows = sqlx::query(sql)
        .bind(container.id_str())
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| OrderedSong {
            song_id: row.get("song_id"),
            title: row.get("title"),
            order_key: row.get("order_key"),
            index,
        })
        .collect())
}

/// Largest key in the container, if it has members
pub async fn max_key(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
) -> Result<Option<OrderKey>> {
    let rel = relation(container);
    let sql = format!(
        "SELECT MAX({key}) AS max_key FROM {table} WHERE {container} = ?",
        key = rel.key,
        table = rel.table,
        container = rel.container,
    );

    let row = sqlx::query(&sql)
        .bind(container.id_str())
        .fetch_one(&mut *conn)
        .await?;

    Ok(row.get::<Option<OrderKey>, _>("max_key"))
}

/// Attach `song_id` to the container at `key`
///
/// Albums only claim songs that belong to no album; a song held by any album
/// (including this one) is rejected. Playlists rely on the
/// `(playlist_id, song_id)` primary key, which surfaces as
/// [`CadenceError::Conflict`].
pub async fn create_membership(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_id: &SongId,
    key: OrderKey,
) -> Result<()> {
    debug_assert!(key.is_valid());

    match container {
        ContainerRef::Album(album_id) => {
            let result = sqlx::query(
                "UPDATE songs SET album_id = ?, album_position = ?
                 WHERE id = ? AND album_id IS NULL",
            )
            .bind(album_id)
            .bind(key)
            .bind(song_id)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(album_claim_error(conn, container, song_id).await?);
            }
        }
        ContainerRef::Playlist(playlist_id) => {
            sqlx::query(
                "INSERT INTO playlist_songs (playlist_id, song_id, position) VALUES (?, ?, ?)",
            )
            .bind(playlist_id)
            .bind(song_id)
            .bind(key)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(())
}

/// Explain why an album could not claim a song
async fn album_claim_error(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_id: &SongId,
) -> Result<CadenceError> {
    let current: Option<Option<String>> = sqlx::query_scalar("SELECT album_id FROM songs WHERE id = ?")
        .bind(song_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(match current {
        None => CadenceError::SongsNotFound(vec![song_id.clone()]),
        Some(Some(album)) if album == container.id_str() => CadenceError::AlreadyMember {
            container: container.to_string(),
            song: song_id.clone(),
        },
        Some(_) => CadenceError::SongsConflict(vec![song_id.clone()]),
    })
}

/// Set the key of an existing member
pub async fn update_key(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_id: &SongId,
    key: OrderKey,
) -> Result<()> {
    let rel = relation(container);
    let sql = format!(
        "UPDATE {table} SET {key} = ? WHERE {container} = ? AND {song} = ?",
        table = rel.table,
        key = rel.key,
        container = rel.container,
        song = rel.song,
    );

    let result = sqlx::query(&sql)
        .bind(key)
        .bind(container.id_str())
        .bind(song_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CadenceError::SongsNotFound(vec![song_id.clone()]));
    }

    Ok(())
}

/// Detach a song from the container, clearing its key
///
/// Returns whether the song was a member.
pub async fn clear_key(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_id: &SongId,
) -> Result<bool> {
    let result = match container {
        ContainerRef::Album(album_id) => {
            sqlx::query(
                "UPDATE songs SET album_id = NULL, album_position = NULL
                 WHERE id = ? AND album_id = ?",
            )
            .bind(song_id)
            .bind(album_id)
            .execute(&mut *conn)
            .await?
        }
        ContainerRef::Playlist(playlist_id) => {
            sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
                .bind(playlist_id)
                .bind(song_id)
                .execute(&mut *conn)
                .await?
        }
    };

    Ok(result.rows_affected() > 0)
}

/// Detach every member of the container
pub async fn clear_all(conn: &mut SqliteConnection, container: &ContainerRef) -> Result<u64> {
    let result = match container {
        ContainerRef::Album(album_id) => {
            sqlx::query("UPDATE songs SET album_id = NULL, album_position = NULL WHERE album_id = ?")
                .bind(album_id)
                .execute(&mut *conn)
                .await?
        }
        ContainerRef::Playlist(playlist_id) => {
            sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ?")
                .bind(playlist_id)
                .execute(&mut *conn)
                .await?
        }
    };

    Ok(result.rows_affected())
}

/// Park one member so it will settle at `target`
pub async fn park_key(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_id: &SongId,
    target: OrderKey,
) -> Result<()> {
    update_key(conn, container, song_id, OrderKey::from_raw(-target.raw() - 1)).await
}

/// Park every member keyed within `first..=last` so it settles `shift` lower
pub async fn park_shifted_range(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    first: OrderKey,
    last: OrderKey,
    shift: i64,
) -> Result<u64> {
    let rel = relation(container);
    let sql = format!(
        "UPDATE {table} SET {key} = -({key} - ?) - 1
         WHERE {container} = ? AND {key} BETWEEN ? AND ?",
        table = rel.table,
        key = rel.key,
        container = rel.container,
    );

    let result = sqlx::query(&sql)
        .bind(shift)
        .bind(container.id_str())
        .bind(first)
        .bind(last)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Move every parked member of the container to its final key
pub async fn settle_parked(conn: &mut SqliteConnection, container: &ContainerRef) -> Result<u64> {
    let rel = relation(container);
    let sql = format!(
        "UPDATE {table} SET {key} = -{key} - 1 WHERE {container} = ? AND {key} < 0",
        table = rel.table,
        key = rel.key,
        container = rel.container,
    );

    let result = sqlx::query(&sql)
        .bind(container.id_str())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Bump the container's `updated_at`
pub async fn touch(conn: &mut SqliteConnection, container: &ContainerRef) -> Result<()> {
    let sql = match container.kind() {
        ContainerKind::Album => "UPDATE albums SET updated_at = datetime('now') WHERE id = ?",
        ContainerKind::Playlist => "UPDATE playlists SET updated_at = datetime('now') WHERE id = ?",
    };

    sqlx::query(sql)
        .bind(container.id_str())
        .execute(&mut *conn)
        .await?;

    Ok(())
}
