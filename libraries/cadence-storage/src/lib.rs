//! Cadence Storage
//!
//! Multi-user `SQLite` persistence for Cadence: catalog slices plus the ordered
//! membership subsystem that keeps album and playlist song order.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each catalog feature owns its queries
//!   (`users`, `songs`, `albums`, `playlists`, `likes`)
//! - **Membership Store** (`memberships`): row-level access to
//!   "container holds song at key K"; the single source of truth for order
//! - **Reorder Engine** (`reorder`): insert-at-index, bulk append, replace-all
//!   and delete-with-compaction, each run inside a caller-provided transaction
//! - **Ordering Service** (`ordering`): validates ownership and song
//!   references, then runs one engine operation per transaction
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{ContainerRef, PlaylistId, SongId, UserId};
//! use cadence_core::ordering::RebalancePolicy;
//! use cadence_storage::{create_pool, run_migrations, OrderingService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cadence.db", 5).await?;
//! run_migrations(&pool).await?;
//!
//! let ordering = OrderingService::new(pool, RebalancePolicy::default());
//! let playlist = ContainerRef::Playlist(PlaylistId::new("road-trip"));
//! ordering
//!     .add_song(&playlist, &SongId::new("song-1"), &UserId::new("alice"), Some(0))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod albums;
pub mod likes;
pub mod playlists;
pub mod songs;
pub mod users;

// Ordered membership subsystem
pub mod memberships;
pub mod ordering;
pub mod reorder;

pub use error::StorageError;
pub use ordering::OrderingService;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://cadence.db>`)
/// * `max_connections` - Upper bound on pooled connections
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(StorageError::Connection)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(StorageError::Connection)?;

    tracing::info!(max_connections, "SQLite pool ready");

    Ok(pool)
}
