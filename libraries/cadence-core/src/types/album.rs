//! Album types

use super::ids::{AlbumId, UserId};
use super::OrderedSong;
use serde::{Deserialize, Serialize};

/// An album owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub owner_id: UserId,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,

    /// Songs in album order (optional, populated when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<OrderedSong>>,
}

/// Data for creating a new album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlbum {
    pub owner_id: UserId,
    pub title: String,
}
