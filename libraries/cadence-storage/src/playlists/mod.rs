use crate::memberships;
use cadence_core::{
    error::Result, CadenceError, ContainerRef, CreatePlaylist, Playlist, PlaylistId, UserId,
};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

fn from_row(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        is_public: row.get::<i64, _>("is_public") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        songs: None,
    }
}

/// Create new playlist
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    let id = PlaylistId::generate();

    sqlx::query(
        r#"
        INSERT INTO playlists (id, owner_id, name, description, is_public)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&playlist.owner_id)
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.is_public)
    .execute(pool)
    .await?;

    get_by_id(pool, &id).await?.ok_or_else(|| {
        CadenceError::storage("Failed to retrieve created playlist")
    })
}

/// Get playlist by ID
pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        r#"
        SELECT id, owner_id, name, description, is_public, created_at, updated_at
        FROM playlists
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(from_row))
}

/// Owner of a playlist, read inside the caller's transaction
pub async fn owner_of(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<Option<UserId>> {
    let owner = sqlx::query_scalar("SELECT owner_id FROM playlists WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(owner)
}

/// Get playlist with all songs in playlist order
pub async fn get_with_songs(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    // First get the playlist
    let Some(mut playlist) = get_by_id(pool, id).await? else {
        return Ok(None);
    };

    // Then its songs
    let mut conn = pool.acquire().await?;
    let songs = memberships::list_songs(&mut conn, &ContainerRef::Playlist(id.clone())).await?;
    playlist.songs = Some(songs);

    Ok(Some(playlist))
}

/// Get user's playlists, most recently changed first
pub async fn list_by_owner(pool: &SqlitePool, owner_id: &UserId) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(
        r#"
        SELECT id, owner_id, name, description, is_public, created_at, updated_at
        FROM playlists
        WHERE owner_id = ?
        ORDER BY updated_at DESC, name
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

/// Delete playlist (memberships cascade)
pub async fn delete(pool: &SqlitePool, id: &PlaylistId, user_id: &UserId) -> Result<()> {
    let playlist = get_by_id(pool, id).await?;

    match playlist {
        Some(p) if &p.owner_id == user_id => {
            sqlx::query("DELETE FROM playlists WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await?;
            Ok(())
        }
        Some(_) => Err(CadenceError::PermissionDenied),
        None => Err(CadenceError::not_found("Playlist", id.as_str())),
    }
}
