//! Song types

use super::ids::{AlbumId, SongId, UserId};
use serde::{Deserialize, Serialize};

/// A song in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub owner_id: UserId,
    pub title: String,
    pub duration_seconds: Option<f64>,

    /// Album this song belongs to, if any (a song belongs to at most one album)
    pub album_id: Option<AlbumId>,

    pub created_at: String,
}

/// Data for creating a new song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSong {
    pub owner_id: UserId,
    pub title: String,
    pub duration_seconds: Option<f64>,
}
