//! Cadence Core
//!
//! Platform-agnostic domain types, errors and ordering arithmetic for Cadence.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `Album`, `Playlist`, `User` and their IDs
//! - **Containers**: `ContainerRef` addresses an album or a playlist uniformly
//! - **Ordering**: the position allocator, rebalance and compaction planners
//!   over fixed-point `OrderKey` values
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//!
//! Nothing in this crate performs I/O. Persistence lives in `cadence-storage`.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::ordering::allocate;
//! use cadence_core::OrderKey;
//!
//! let keys = [OrderKey::from_index(0), OrderKey::from_index(1)];
//! let key = allocate(&keys, 1).expect("room between 0 and 1");
//! assert!(keys[0] < key && key < keys[1]);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod ordering;
pub mod types;

// Re-export commonly used types
pub use error::{CadenceError, Result};

pub use types::{
    Album, AlbumId, ContainerKind, ContainerRef, CreateAlbum, CreatePlaylist, CreateSong,
    CreateUser, OrderKey, OrderedSong, Playlist, PlaylistId, Song, SongId, User, UserId,
};
