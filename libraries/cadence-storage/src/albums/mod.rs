use crate::memberships;
use cadence_core::{error::Result, Album, AlbumId, CadenceError, ContainerRef, CreateAlbum, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

fn from_row(row: &SqliteRow) -> Album {
    Album {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        songs: None,
    }
}

pub async fn create(pool: &SqlitePool, album: CreateAlbum) -> Result<Album> {
    let id = AlbumId::generate();

    sqlx::query("INSERT INTO albums (id, owner_id, title) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(&album.owner_id)
        .bind(&album.title)
        .execute(pool)
        .await?;

    get_by_id(pool, &id).await?.ok_or_else(|| {
        CadenceError::storage("Failed to retrieve created album")
    })
}

pub async fn get_by_id(pool: &SqlitePool, id: &AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT id, owner_id, title, created_at, updated_at FROM albums WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(from_row))
}

/// Owner of an album, read inside the caller's transaction
pub async fn owner_of(conn: &mut SqliteConnection, id: &AlbumId) -> Result<Option<UserId>> {
    let owner = sqlx::query_scalar("SELECT owner_id FROM albums WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(owner)
}

/// Get album with its songs in album order
pub async fn get_with_songs(pool: &SqlitePool, id: &AlbumId) -> Result<Option<Album>> {
    let Some(mut album) = get_by_id(pool, id).await? else {
        return Ok(None);
    };

    let mut conn = pool.acquire().await?;
    let songs = memberships::list_songs(&mut conn, &ContainerRef::Album(id.clone())).await?;
    album.songs = Some(songs);

    Ok(Some(album))
}

pub async fn list_by_owner(pool: &SqlitePool, owner_id: &UserId) -> Result<Vec<Album>> {
    let rows = sqlx::query(
        "SELECT id, owner_id, title, created_at, updated_at
         FROM albums
         WHERE owner_id = ?
         ORDER BY updated_at DESC, title",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

/// Delete album
///
/// Its songs stay in the catalog and are released from the album first, in
/// the same transaction.
pub async fn delete(pool: &SqlitePool, id: &AlbumId, user_id: &UserId) -> Result<()> {
    let mut tx = pool.begin().await?;

    match owner_of(&mut *tx, id).await? {
        Some(owner) if &owner == user_id => {}
        Some(_) => return Err(CadenceError::PermissionDenied),
        None => return Err(CadenceError::not_found("Album", id.as_str())),
    }

    memberships::clear_all(&mut *tx, &ContainerRef::Album(id.clone())).await?;

    sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}
