use crate::types::OrderKey;

/// A maximal run of consecutive surviving members moved down by the same amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRun {
    /// Key of the first member of the run (before shifting)
    pub first: OrderKey,

    /// Key of the last member of the run (before shifting)
    pub last: OrderKey,

    /// Number of members in the run
    pub len: usize,

    /// Raw units subtracted from every key in the run
    pub shift: i64,
}

/// Result of planning a removal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompactionPlan {
    /// Keys of the members being removed, ascending
    pub removed: Vec<OrderKey>,

    /// Shifts for survivors, ascending; runs that do not move are omitted
    pub runs: Vec<ShiftRun>,
}

impl CompactionPlan {
    /// Keys of the survivors after the plan is applied, in order
    pub fn apply(&self, keys: &[OrderKey]) -> Vec<OrderKey> {
        keys.iter()
            .filter(|key| self.removed.binary_search(key).is_err())
            .map(|key| {
                let shift = self
                    .runs
                    .iter()
                    .find(|run| run.first <= *key && *key <= run.last)
                    .map_or(0, |run| run.shift);
                OrderKey::from_raw(key.raw() - shift)
            })
            .collect()
    }
}

/// Plan the removal of the members at `removed` (indices into `keys`)
///
/// Each survivor moves down by one logical unit per removed member before it,
/// closing the gaps. Survivors between two removals form a run sharing one
/// shift, so the store can move each run with a single range update. A run's
/// shift is capped so it stays above the previous run's new last key, which
/// matters only when fractional keys sit closer than one unit apart.
///
/// Out-of-range and repeated indices are ignored.
pub fn plan_compaction(keys: &[OrderKey], removed: &[usize]) -> CompactionPlan {
    let mut doomed: Vec<usize> = removed
        .iter()
        .copied()
        .filter(|&index| index < keys.len())
        .collect();
    doomed.sort_unstable();
    doomed.dedup();

    let mut runs = Vec::new();
    let mut removed_before = 0usize;
    // New key of the last survivor seen so far; keys never go below zero
    let mut previous_new = -1i64;
    let mut cursor = 0usize;

    for boundary in doomed.iter().copied().chain(std::iter::once(keys.len())) {
        let survivors = &keys[cursor..boundary];
        if let (Some(first), Some(last)) = (survivors.first(), survivors.last()) {
            let wanted = removed_before as i64 * OrderKey::UNIT;
            let room = first.raw() - previous_new - 1;
            let shift = wanted.min(room).max(0);

            if shift > 0 {
                runs.push(ShiftRun {
                    first: *first,
                    last: *last,
                    len: survivors.len(),
                    shift,
                });
            }
            previous_new = last.raw() - shift;
        }

        removed_before += 1;
        cursor = boundary + 1;
    }

    CompactionPlan {
        removed: doomed.iter().map(|&index| keys[index]).collect(),
        runs,
    }
}
