//! Ordering service
//!
//! Entry point for album and playlist song ordering. Each call runs in one
//! transaction: the container, ownership and every referenced song are
//! checked first (collecting all bad IDs before failing), then exactly one
//! reorder-engine operation writes, then the transaction commits. Any error
//! drops the transaction, which rolls it back, so rejected calls leave stored
//! order untouched.
//!
//! Transaction isolation is the only concurrency control. Transactions take
//! the write lock up front (`BEGIN IMMEDIATE`) so concurrent writers queue on
//! the connection's busy timeout instead of failing a read-to-write upgrade.
//! If `SQLite` still reports the database busy, the whole operation is
//! retried in a fresh transaction, a bounded number of times.

use crate::reorder::{self, Placement};
use crate::{albums, memberships, playlists, songs};
use cadence_core::ordering::RebalancePolicy;
use cadence_core::{
    error::Result, CadenceError, ContainerRef, OrderKey, OrderedSong, SongId, UserId,
};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

/// Attempts per operation when the database is busy
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const BASE_RETRY_DELAY_MS: u64 = 10;

/// Validated, transactional ordering operations over albums and playlists
#[derive(Clone)]
pub struct OrderingService {
    pool: SqlitePool,
    policy: RebalancePolicy,
    max_attempts: u32,
}

impl OrderingService {
    pub fn new(pool: SqlitePool, policy: RebalancePolicy) -> Self {
        Self {
            pool,
            policy,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override how many times a busy operation is attempted (at least once)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn policy(&self) -> &RebalancePolicy {
        &self.policy
    }

    /// Songs of a container in display order
    pub async fn list_songs(&self, container: &ContainerRef) -> Result<Vec<OrderedSong>> {
        let mut conn = self.pool.acquire().await?;
        if container_owner(&mut conn, container).await?.is_none() {
            return Err(container_not_found(container));
        }

        memberships::list_songs(&mut conn, container).await
    }

    /// Add one song at `index` (append when absent or past the end)
    ///
    /// Errors: container or song missing (`NotFound`/`SongsNotFound`),
    /// not the owner (`PermissionDenied`), song held by another album
    /// (`SongsConflict`), song already in this container (`AlreadyMember`).
    pub async fn add_song(
        &self,
        container: &ContainerRef,
        song_id: &SongId,
        user_id: &UserId,
        index: Option<usize>,
    ) -> Result<Placement> {
        self.retrying("add_song", container, || {
            self.try_add_song(container, song_id, user_id, index)
        })
        .await
    }

    async fn try_add_song(
        &self,
        container: &ContainerRef,
        song_id: &SongId,
        user_id: &UserId,
        index: Option<usize>,
    ) -> Result<Placement> {
        let mut tx = self.begin_write().await?;

        authorize(&mut tx, container, user_id).await?;
        check_songs(&mut tx, container, std::slice::from_ref(song_id)).await?;

        let placement = reorder::add_song(&mut tx, container, song_id, index, &self.policy).await?;
        memberships::touch(&mut tx, container).await?;

        tx.commit().await?;

        tracing::debug!(
            container = %container,
            song = %song_id,
            index = placement.index,
            rebalanced = placement.rebalanced,
            "Added song"
        );

        Ok(placement)
    }

    /// Append songs in the given order
    ///
    /// Every missing song is reported at once (`SongsNotFound`), as is every
    /// song already in this container or held by another album
    /// (`SongsConflict`). Nothing is written unless all songs are accepted.
    pub async fn add_songs(
        &self,
        container: &ContainerRef,
        song_ids: &[SongId],
        user_id: &UserId,
    ) -> Result<Vec<OrderKey>> {
        reject_duplicates(song_ids)?;

        self.retrying("add_songs", container, || {
            self.try_add_songs(container, song_ids, user_id)
        })
        .await
    }

    async fn try_add_songs(
        &self,
        container: &ContainerRef,
        song_ids: &[SongId],
        user_id: &UserId,
    ) -> Result<Vec<OrderKey>> {
        let mut tx = self.begin_write().await?;

        authorize(&mut tx, container, user_id).await?;
        let mut conflicts = check_songs_collecting(&mut tx, container, song_ids).await?;

        let current = memberships::list_ordered(&mut tx, container).await?;
        let members: HashSet<&SongId> = current.iter().map(|member| &member.song_id).collect();
        conflicts.extend(
            song_ids
                .iter()
                .filter(|id| members.contains(id) && !conflicts.contains(id))
                .cloned()
                .collect::<Vec<_>>(),
        );
        if !conflicts.is_empty() {
            return Err(CadenceError::SongsConflict(conflicts));
        }

        if song_ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys = reorder::add_songs(&mut tx, container, song_ids).await?;
        memberships::touch(&mut tx, container).await?;

        tx.commit().await?;

        tracing::debug!(container = %container, count = keys.len(), "Appended songs");

        Ok(keys)
    }

    /// Replace the container's songs with `song_ids`, in that order
    ///
    /// Validation (missing songs, songs held by a different album) completes
    /// before the current members are detached.
    pub async fn set_songs(
        &self,
        container: &ContainerRef,
        song_ids: &[SongId],
        user_id: &UserId,
    ) -> Result<()> {
        reject_duplicates(song_ids)?;

        self.retrying("set_songs", container, || {
            self.try_set_songs(container, song_ids, user_id)
        })
        .await
    }

    async fn try_set_songs(
        &self,
        container: &ContainerRef,
        song_ids: &[SongId],
        user_id: &UserId,
    ) -> Result<()> {
        let mut tx = self.begin_write().await?;

        authorize(&mut tx, container, user_id).await?;
        check_songs(&mut tx, container, song_ids).await?;

        let detached = reorder::set_songs(&mut tx, container, song_ids).await?;
        memberships::touch(&mut tx, container).await?;

        tx.commit().await?;

        tracing::debug!(
            container = %container,
            detached,
            attached = song_ids.len(),
            "Replaced songs"
        );

        Ok(())
    }

    /// Remove songs and compact the remaining order
    ///
    /// Songs that are not members are reported together (`SongsNotFound`)
    /// and nothing is removed.
    pub async fn delete_songs(
        &self,
        container: &ContainerRef,
        song_ids: &[SongId],
        user_id: &UserId,
    ) -> Result<usize> {
        self.retrying("delete_songs", container, || {
            self.try_delete_songs(container, song_ids, user_id)
        })
        .await
    }

    async fn try_delete_songs(
        &self,
        container: &ContainerRef,
        song_ids: &[SongId],
        user_id: &UserId,
    ) -> Result<usize> {
        let mut tx = self.begin_write().await?;

        authorize(&mut tx, container, user_id).await?;

        let current = memberships::list_ordered(&mut tx, container).await?;
        let members: HashSet<&SongId> = current.iter().map(|member| &member.song_id).collect();
        let missing = distinct(song_ids.iter().filter(|id| !members.contains(id)));
        if !missing.is_empty() {
            return Err(CadenceError::SongsNotFound(missing));
        }

        let removed = reorder::delete_songs(&mut tx, container, song_ids).await?;
        if removed > 0 {
            memberships::touch(&mut tx, container).await?;
        }

        tx.commit().await?;

        tracing::debug!(container = %container, removed, "Removed songs");

        Ok(removed)
    }

    /// Open a transaction holding the database write lock
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    async fn retrying<T, F, Fut>(
        &self,
        operation: &'static str,
        container: &ContainerRef,
        mut attempt_once: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        operation,
                        container = %container,
                        attempt,
                        error = %err,
                        "Database busy, retrying ordering operation"
                    );
                    // Exponential backoff
                    let delay = BASE_RETRY_DELAY_MS * 2_u64.pow(attempt - 1);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

fn container_not_found(container: &ContainerRef) -> CadenceError {
    CadenceError::not_found(container.kind().entity(), container.id_str())
}

async fn container_owner(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
) -> Result<Option<UserId>> {
    match container {
        ContainerRef::Album(id) => albums::owner_of(conn, id).await,
        ContainerRef::Playlist(id) => playlists::owner_of(conn, id).await,
    }
}

async fn authorize(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    user_id: &UserId,
) -> Result<()> {
    match container_owner(conn, container).await? {
        Some(owner) if &owner == user_id => Ok(()),
        Some(_) => Err(CadenceError::PermissionDenied),
        None => Err(container_not_found(container)),
    }
}

fn reject_duplicates(song_ids: &[SongId]) -> Result<()> {
    let mut seen = HashSet::with_capacity(song_ids.len());
    let repeated = distinct(song_ids.iter().filter(|id| !seen.insert(*id)));
    if repeated.is_empty() {
        Ok(())
    } else {
        Err(CadenceError::invalid_input(format!(
            "songs listed more than once: {}",
            repeated.iter().map(SongId::as_str).collect::<Vec<_>>().join(", ")
        )))
    }
}

/// Fail on missing songs or songs held by a different album
async fn check_songs(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_ids: &[SongId],
) -> Result<()> {
    let conflicts = check_songs_collecting(conn, container, song_ids).await?;
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(CadenceError::SongsConflict(conflicts))
    }
}

/// Fail on missing songs; return (in input order) songs held by a different album
async fn check_songs_collecting(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_ids: &[SongId],
) -> Result<Vec<SongId>> {
    let found = songs::find_album_assignments(conn, song_ids).await?;

    let existing: HashSet<&SongId> = found.iter().map(|(id, _)| id).collect();
    let missing = distinct(song_ids.iter().filter(|id| !existing.contains(id)));
    if !missing.is_empty() {
        return Err(CadenceError::SongsNotFound(missing));
    }

    let ContainerRef::Album(album_id) = container else {
        return Ok(Vec::new());
    };

    let elsewhere: HashSet<&SongId> = found
        .iter()
        .filter(|(_, album)| album.as_ref().is_some_and(|album| album != album_id))
        .map(|(id, _)| id)
        .collect();

    Ok(distinct(song_ids.iter().filter(|id| elsewhere.contains(id))))
}

/// Clone IDs, dropping repeats, keeping first-seen order
fn distinct<'a>(ids: impl Iterator<Item = &'a SongId>) -> Vec<SongId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_listed_once_each() {
        let ids: Vec<SongId> = ["a", "b", "a", "c", "b", "a"].into_iter().map(SongId::new).collect();
        let err = reject_duplicates(&ids).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: songs listed more than once: a, b");
    }

    #[test]
    fn distinct_ids_pass() {
        let ids: Vec<SongId> = ["a", "b"].into_iter().map(SongId::new).collect();
        assert!(reject_duplicates(&ids).is_ok());
    }
}
