//! Playlist types

use super::ids::{PlaylistId, UserId};
use super::OrderedSong;
use serde::{Deserialize, Serialize};

/// Playlist owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,

    /// Songs in playlist order (optional, populated when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<OrderedSong>>,
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}
