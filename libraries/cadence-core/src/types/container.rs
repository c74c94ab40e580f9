//! Ordered containers: albums and playlists share one ordering model

use super::ids::{AlbumId, PlaylistId, SongId};
use super::OrderKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which relation a container's memberships live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Exclusive: a song belongs to at most one album
    Album,
    /// Many-to-many: a song may appear in any number of playlists
    Playlist,
}

impl ContainerKind {
    /// Entity name used in error messages
    pub fn entity(self) -> &'static str {
        match self {
            ContainerKind::Album => "Album",
            ContainerKind::Playlist => "Playlist",
        }
    }
}

/// Reference to an album or playlist holding an ordered set of songs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    Album(AlbumId),
    Playlist(PlaylistId),
}

impl ContainerRef {
    pub fn kind(&self) -> ContainerKind {
        match self {
            ContainerRef::Album(_) => ContainerKind::Album,
            ContainerRef::Playlist(_) => ContainerKind::Playlist,
        }
    }

    /// Raw identifier, for binding into queries
    pub fn id_str(&self) -> &str {
        match self {
            ContainerRef::Album(id) => id.as_str(),
            ContainerRef::Playlist(id) => id.as_str(),
        }
    }
}

impl From<AlbumId> for ContainerRef {
    fn from(id: AlbumId) -> Self {
        ContainerRef::Album(id)
    }
}

impl From<PlaylistId> for ContainerRef {
    fn from(id: PlaylistId) -> Self {
        ContainerRef::Playlist(id)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Album(id) => write!(f, "album {}", id),
            ContainerRef::Playlist(id) => write!(f, "playlist {}", id),
        }
    }
}

/// Song as seen through a container's ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedSong {
    pub song_id: SongId,
    pub title: String,
    pub order_key: OrderKey,

    /// 0-based display position derived from the key order
    pub index: usize,
}
