//! Position arithmetic for ordered containers
//!
//! Pure functions over a snapshot of a container's order keys (sorted
//! ascending). The storage layer loads the snapshot inside a transaction,
//! asks these planners what to write, and persists the result.
//!
//! - [`allocate`]: key for a new member at a target index, or [`Exhausted`]
//! - [`plan_rebalance`]: respacing of a window around an exhausted index
//! - [`plan_compaction`]: downward shifts closing the gaps left by removals

mod allocator;
mod compaction;
mod rebalance;

pub use allocator::{allocate, Exhausted};
pub use compaction::{plan_compaction, CompactionPlan, ShiftRun};
pub use rebalance::{plan_rebalance, RebalancePlan, RebalancePolicy, CROWDED_RATIO, MIN_STEP};

use crate::types::OrderKey;

/// Whether keys are strictly increasing and persistable
pub fn is_strictly_ordered(keys: &[OrderKey]) -> bool {
    keys.iter().all(|key| key.is_valid()) && keys.windows(2).all(|pair| pair[0] < pair[1])
}
