/// Songs API routes
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cadence_core::{CreateSong, Song, SongId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// POST /api/songs
/// Add a song to the catalog, owned by the authenticated user
pub async fn create_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CreateSongRequest>,
) -> Result<(StatusCode, Json<Song>)> {
    if req.title.trim().is_empty() {
        return Err(ServerError::BadRequest("Song title is required".to_string()));
    }

    let song = cadence_storage::songs::create(
        &app_state.pool,
        CreateSong {
            owner_id: auth.user_id().clone(),
            title: req.title,
            duration_seconds: req.duration_seconds,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(song)))
}

/// GET /api/songs/:id
pub async fn get_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Song>> {
    let song = cadence_storage::songs::get_by_id(&app_state.pool, &SongId::new(id))
        .await?
        .ok_or_else(|| ServerError::NotFound("Song not found".to_string()))?;

    Ok(Json(song))
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    cadence_storage::songs::delete(&app_state.pool, &SongId::new(id), auth.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/songs/:id/like
pub async fn like_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<LikeResponse>> {
    let song_id = SongId::new(id);
    cadence_storage::likes::like_song(&app_state.pool, auth.user_id(), &song_id).await?;

    let like_count = cadence_storage::likes::like_count(&app_state.pool, &song_id).await?;
    Ok(Json(LikeResponse {
        liked: true,
        like_count,
    }))
}

/// DELETE /api/songs/:id/like
pub async fn unlike_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<LikeResponse>> {
    let song_id = SongId::new(id);
    cadence_storage::likes::unlike_song(&app_state.pool, auth.user_id(), &song_id).await?;

    let like_count = cadence_storage::likes::like_count(&app_state.pool, &song_id).await?;
    Ok(Json(LikeResponse {
        liked: false,
        like_count,
    }))
}

/// GET /api/songs/liked
/// Songs liked by the authenticated user, most recent first
pub async fn liked_songs(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Song>>> {
    let songs = cadence_storage::likes::liked_songs(&app_state.pool, auth.user_id()).await?;
    Ok(Json(songs))
}
