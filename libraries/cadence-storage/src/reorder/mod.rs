//! Reorder engine
//!
//! Each operation runs against the caller's open transaction: it loads the
//! container's ordered snapshot, asks the planners in `cadence_core::ordering`
//! what to write, and writes it through the membership store. Nothing here
//! commits; the caller commits on success and a dropped transaction rolls
//! back, so a failed step never leaves a partial reorder behind.
//!
//! The snapshot is transient. The store stays the only source of truth.

use crate::memberships::{self, Membership};
use cadence_core::ordering::{
    allocate, plan_compaction, plan_rebalance, CompactionPlan, RebalancePlan, RebalancePolicy,
};
use cadence_core::{error::Result, CadenceError, ContainerRef, OrderKey, SongId};
use sqlx::SqliteConnection;

/// Where a single added song ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Display index of the new member
    pub index: usize,

    /// Key assigned to the new member
    pub key: OrderKey,

    /// Existing members renumbered to make room (0 when no rebalance ran)
    pub rebalanced: usize,
}

/// Insert `song_id` at `index`, or append when `index` is absent or past the end
///
/// Fails with [`CadenceError::AlreadyMember`] without writing anything when
/// the song is already in the container. When the neighbours at `index` have
/// no room between them, a window around `index` is respaced first.
pub async fn add_song(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_id: &SongId,
    index: Option<usize>,
    policy: &RebalancePolicy,
) -> Result<Placement> {
    let snapshot = memberships::list_ordered(conn, container).await?;

    if snapshot.iter().any(|member| &member.song_id == song_id) {
        return Err(CadenceError::AlreadyMember {
            container: container.to_string(),
            song: song_id.clone(),
        });
    }

    let keys: Vec<OrderKey> = snapshot.iter().map(|member| member.order_key).collect();
    let index = index.filter(|&i| i < keys.len()).unwrap_or(keys.len());

    let (key, rebalanced) = match allocate(&keys, index) {
        Ok(key) => (key, 0),
        Err(exhausted) => {
            let plan = plan_rebalance(&keys, index, policy);
            tracing::debug!(
                container = %container,
                index = exhausted.index,
                window = ?plan.window,
                step = plan.step,
                "Order keys exhausted, rebalancing window"
            );

            let moved = apply_rebalance(conn, container, &snapshot, &plan).await?;
            let updated = plan.apply(&keys);
            let key = allocate(&updated, index).map_err(|e| {
                CadenceError::storage(format!("rebalance left no room in {}: {}", container, e))
            })?;
            (key, moved)
        }
    };

    memberships::create_membership(conn, container, song_id, key).await?;

    Ok(Placement {
        index,
        key,
        rebalanced,
    })
}

/// Write a rebalance plan; returns how many members moved
async fn apply_rebalance(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    snapshot: &[Membership],
    plan: &RebalancePlan,
) -> Result<usize> {
    let mut moved = 0;
    for (member, new_key) in snapshot[plan.window.clone()].iter().zip(&plan.keys) {
        if member.order_key != *new_key {
            memberships::park_key(conn, container, &member.song_id, *new_key).await?;
            moved += 1;
        }
    }

    if moved > 0 {
        memberships::settle_parked(conn, container).await?;
    }

    Ok(moved)
}

/// Append songs after the current last member, in the given order
///
/// Keys are consecutive whole units starting right after the current maximum
/// (or at zero for an empty container). Pre-existing membership is not checked
/// here; the store rejects it and the caller's transaction rolls back whole.
pub async fn add_songs(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_ids: &[SongId],
) -> Result<Vec<OrderKey>> {
    let mut key = memberships::max_key(conn, container)
        .await?
        .map_or(OrderKey::ZERO, OrderKey::next);

    let mut assigned = Vec::with_capacity(song_ids.len());
    for song_id in song_ids {
        memberships::create_membership(conn, container, song_id, key).await?;
        assigned.push(key);
        key = key.next();
    }

    Ok(assigned)
}

/// Replace the container's members with `song_ids`, keyed `0..n` in order
///
/// Every current member is detached before any new one is attached.
pub async fn set_songs(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_ids: &[SongId],
) -> Result<u64> {
    let detached = memberships::clear_all(conn, container).await?;

    for (index, song_id) in song_ids.iter().enumerate() {
        memberships::create_membership(conn, container, song_id, OrderKey::from_index(index))
            .await?;
    }

    Ok(detached)
}

/// Remove the listed members and close the gaps they leave
///
/// Songs that are not members are skipped. Survivors keep their relative
/// order; each contiguous run of survivors moves with one range update.
/// Returns the number of members removed.
pub async fn delete_songs(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    song_ids: &[SongId],
) -> Result<usize> {
    let snapshot = memberships::list_ordered(conn, container).await?;

    let doomed: Vec<usize> = snapshot
        .iter()
        .enumerate()
        .filter(|(_, member)| song_ids.contains(&member.song_id))
        .map(|(index, _)| index)
        .collect();

    if doomed.is_empty() {
        return Ok(0);
    }

    let keys: Vec<OrderKey> = snapshot.iter().map(|member| member.order_key).collect();
    let plan = plan_compaction(&keys, &doomed);

    for &index in &doomed {
        memberships::clear_key(conn, container, &snapshot[index].song_id).await?;
    }

    apply_compaction(conn, container, &plan).await?;

    Ok(doomed.len())
}

async fn apply_compaction(
    conn: &mut SqliteConnection,
    container: &ContainerRef,
    plan: &CompactionPlan,
) -> Result<()> {
    if plan.runs.is_empty() {
        return Ok(());
    }

    for run in &plan.runs {
        let parked =
            memberships::park_shifted_range(conn, container, run.first, run.last, run.shift)
                .await?;
        if parked != run.len as u64 {
            return Err(CadenceError::storage(format!(
                "{} changed during compaction: expected {} members in run, found {}",
                container, run.len, parked
            )));
        }
    }

    memberships::settle_parked(conn, container).await?;

    tracing::debug!(container = %container, runs = plan.runs.len(), "Compacted order keys");

    Ok(())
}
