mod album;
mod container;
mod ids;
mod order_key;
mod playlist;
mod song;
mod user;

pub use album::{Album, CreateAlbum};
pub use container::{ContainerKind, ContainerRef, OrderedSong};
pub use ids::{AlbumId, PlaylistId, SongId, UserId};
pub use order_key::OrderKey;
pub use playlist::{CreatePlaylist, Playlist};
pub use song::{CreateSong, Song};
pub use user::{CreateUser, User};
