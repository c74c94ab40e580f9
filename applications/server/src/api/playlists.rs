/// Playlists API routes
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
use cadence_core::{ContainerRef, CreatePlaylist, OrderedSong, Playlist, PlaylistId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

fn playlist(id: String) -> ContainerRef {
    ContainerRef::Playlist(PlaylistId::new(id))
}

/// GET /api/playlists
/// Playlists owned by the authenticated user
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Playlist>>> {
    let playlists =
        cadence_storage::playlists::list_by_owner(&app_state.pool, auth.user_id()).await?;
    Ok(Json(playlists))
}

/// POST /api/playlists
/// Create a new playlist
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Playlist>)> {
    if req.name.trim().is_empty() {
        return Err(ServerError::BadRequest("Playlist name is required".to_string()));
    }

    let playlist = cadence_storage::playlists::create(
        &app_state.pool,
        CreatePlaylist {
            owner_id: auth.user_id().clone(),
            name: req.name,
            description: req.description,
            is_public: req.is_public,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/:id
/// Get playlist details with songs
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Playlist>> {
    let playlist =
        cadence_storage::playlists::get_with_songs(&app_state.pool, &PlaylistId::new(id))
            .await?
            .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;

    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
/// Delete a playlist
pub async fn delete_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    cadence_storage::playlists::delete(&app_state.pool, &PlaylistId::new(id), auth.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/playlists/:id/songs
pub async fn list_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::list(&app_state, &playlist(id)).await
}

/// POST /api/playlists/:id/songs
/// Insert one song (optionally at an index) or append several
pub async fn add_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AddSongsRequest>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::add(&app_state, &playlist(id), &auth, req).await
}

/// PUT /api/playlists/:id/songs
/// Replace the playlist's songs with the given list, in order
pub async fn set_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<SongIdsRequest>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::replace(&app_state, &playlist(id), &auth, req).await
}

/// DELETE /api/playlists/:id/songs
pub async fn delete_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<SongIdsRequest>,
) -> Result<Json<Vec<OrderedSong>>> {
    container_songs::remove(&app_state, &playlist(id), &auth, req).await
}
