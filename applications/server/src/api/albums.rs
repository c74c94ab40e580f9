/// Albums API routes
use crate::{
    api::container_songs::{self, AddSongsRequest, SongIdsRequest},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cadence_core::{Album, AlbumId, ContainerRef, CreateAlbum, OrderedSong};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub title: String,
}

fn album(id: String) -> ContainerRef {
    ContainerRef::Album(AlbumId::new(id))
}

/// GET /api/albums
/// Albums owned by the authenticated user
pub async fn list_albums(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Album>>> {
    let albums = cadence_storage::albums::list_by_owner(&app_state.pool, auth.user_id()).await?;
    Ok(Json(albums))
}

/// POST /api/albums
pub async fn create_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CreateAlbumRequest>,
) -> Result<(StatusCode, Json<Album>)> {
    if req.title.trim().is_empty() {
        return Err(ServerError::BadRequest("Album title is required".to_string()));
    }

    let album = cadence_storage::albums::create(
        &app_state.pool,
        CreateAlbum {
            owner_id: auth.user_id().clone(),
            title: req.title,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(album)))
}

/// GET /api/albums/:id
/// Album details with songs in album order
pub async fn get_album(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Album>> {
    let album = cadence_storage::albums::get_with_songs(&app_state.pool, &AlbumId::new(id))
        .await?
        .ok_or_else(|| ServerError::NotFound("Album not found".to_string()))?;

    Ok(Json(album))
}

/// DELETE /api/albums/:id
/// Delete an album; its songs stay in the catalog
pub async fn delete_album(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    cadence_storage::albums::delete(&app_state.pool, &AlbumId::new(id), auth.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/albums/:id/songs
pub async fn list_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::list(&app_state, &album(id)).await
}

/// POST /api/albums/:id/songs
/// Insert one song (optionally at an index) or append several
pub async fn add_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AddSongsRequest>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::add(&app_state, &album(id), &auth, req).await
}

/// PUT /api/albums/:id/songs
/// Replace the album's songs with the given list, in order
pub async fn set_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<SongIdsRequest>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::replace(&app_state, &album(id), &auth, req).await
}

/// DELETE /api/albums/:id/songs
pub async fn delete_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<SongIdsRequest>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::remove(&app_state, &album(id), &auth, req).await
}
