use crate::types::OrderKey;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Smallest spacing (raw units) a rebalanced window may use.
///
/// Two units leave room for at least one midpoint between any pair.
pub const MIN_STEP: i64 = 2;

/// A bounded window whose fitted spacing falls below `step / CROWDED_RATIO`
/// is abandoned for a respace of the whole container at the preferred step.
pub const CROWDED_RATIO: i64 = 64;

/// Tuning for local rebalances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePolicy {
    /// Members taken on each side of the target index, and the growth per expansion
    pub radius: usize,

    /// Preferred spacing (raw units) between respaced keys
    pub step: i64,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            radius: 5,
            step: 10 * OrderKey::UNIT,
        }
    }
}

/// New keys for a contiguous window of existing members
///
/// The window is respaced with one empty slot left directly before the member
/// at the target index, so allocating at that index afterwards succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalancePlan {
    /// Indices (into the snapshot) of the members being renumbered
    pub window: Range<usize>,

    /// Replacement keys for `window`, in order
    pub keys: Vec<OrderKey>,

    /// Spacing used between slots
    pub step: i64,
}

impl RebalancePlan {
    /// The snapshot with the window's keys replaced
    pub fn apply(&self, keys: &[OrderKey]) -> Vec<OrderKey> {
        let mut updated = keys.to_vec();
        updated[self.window.clone()].copy_from_slice(&self.keys);
        updated
    }

    /// `(old, new)` pairs for members whose key actually changes
    pub fn changes<'a>(
        &'a self,
        keys: &'a [OrderKey],
    ) -> impl Iterator<Item = (OrderKey, OrderKey)> + 'a {
        keys[self.window.clone()]
            .iter()
            .copied()
            .zip(self.keys.iter().copied())
            .filter(|(old, new)| old != new)
    }
}

/// Plan a local rebalance so a new member fits before `keys[index]`
///
/// Starts with `policy.radius` members on each side of `index` and widens by
/// the same amount in both directions while the span between the window's
/// outer neighbours cannot hold every slot at [`MIN_STEP`] spacing. A window
/// that reaches the end of the container has no upper bound and always fits.
///
/// When the fitting window would still be crowded (spacing below
/// `policy.step / CROWDED_RATIO`), every member is respaced at `policy.step`
/// instead, so repeated prepends and clamped compactions do not leave a
/// region that rebalances on nearly every insert.
///
/// `keys` must be non-empty, sorted, and `index < keys.len()`.
pub fn plan_rebalance(keys: &[OrderKey], index: usize, policy: &RebalancePolicy) -> RebalancePlan {
    let len = keys.len();
    debug_assert!(index < len, "rebalance target must precede an existing member");

    let radius = policy.radius.max(1);
    let preferred = policy.step.max(MIN_STEP);

    let mut lo = index.saturating_sub(radius);
    let mut hi = (index + radius).min(len);

    let (floor, step) = loop {
        // Keys start at zero, so the open lower bound of the container is -1
        let floor = if lo == 0 { -1 } else { keys[lo - 1].raw() };
        if hi == len {
            break (floor, preferred);
        }

        let slots = (hi - lo + 1) as i64;
        let ceiling = keys[hi].raw();
        let fit = (ceiling - floor - 1) / slots;
        if fit >= MIN_STEP {
            if fit < preferred / CROWDED_RATIO {
                lo = 0;
                hi = len;
                break (-1, preferred);
            }
            break (floor, fit.min(preferred));
        }

        lo = lo.saturating_sub(radius);
        hi = (hi + radius).min(len);
    };

    let new_keys = (lo..hi)
        .map(|member| {
            let slot = (member - lo) as i64 + i64::from(member >= index);
            OrderKey::from_raw(floor + step * (slot + 1))
        })
        .collect();

    RebalancePlan {
        window: lo..hi,
        keys: new_keys,
        step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::{allocate, is_strictly_ordered};

    fn keys(raw: &[i64]) -> Vec<OrderKey> {
        raw.iter().copied().map(OrderKey::from_raw).collect()
    }

    #[test]
    fn window_reaching_the_tail_uses_preferred_step() {
        let snapshot = keys(&[0, 1]);
        let plan = plan_rebalance(&snapshot, 1, &RebalancePolicy::default());

        assert_eq!(plan.window, 0..2);
        assert_eq!(plan.step, 10 * OrderKey::UNIT);

        let updated = plan.apply(&snapshot);
        assert!(is_strictly_ordered(&updated));

        let new_key = allocate(&updated, 1).unwrap();
        assert!(updated[0] < new_key && new_key < updated[1]);
    }

    #[test]
    fn bounded_window_stays_between_outer_neighbours() {
        let snapshot = keys(&[0, 100, 101, 102, 103, 104, 1_000, 2_000]);
        let policy = RebalancePolicy { radius: 2, step: 100 };

        let plan = plan_rebalance(&snapshot, 3, &policy);
        assert_eq!(plan.window, 1..5);
        assert_eq!(plan.step, 20);
        assert_eq!(plan.keys, keys(&[20, 40, 80, 100]));

        let updated = plan.apply(&snapshot);
        assert!(is_strictly_ordered(&updated));
        assert_eq!(allocate(&updated, 3), Ok(OrderKey::from_raw(60)));
    }

    #[test]
    fn window_expands_until_the_span_fits() {
        let snapshot = keys(&[0, 1_000, 1_001, 1_002, 1_003, 1_004, 1_005, 1_006, 5_000]);
        let policy = RebalancePolicy { radius: 1, step: 10 };

        let plan = plan_rebalance(&snapshot, 4, &policy);
        assert_eq!(plan.window, 1..7);
        assert_eq!(plan.step, 10);
        assert!(is_strictly_ordered(&plan.apply(&snapshot)));
    }

    #[test]
    fn dense_container_grows_window_to_the_tail() {
        let raw: Vec<i64> = (0..20).collect();
        let snapshot = keys(&raw);
        let policy = RebalancePolicy { radius: 3, step: 10 };

        let plan = plan_rebalance(&snapshot, 5, &policy);
        assert_eq!(plan.window, 0..snapshot.len());
        assert!(is_strictly_ordered(&plan.apply(&snapshot)));
    }

    #[test]
    fn prefix_rebalance_leaves_room_for_prepend() {
        let snapshot = keys(&[0, 1, 2]);
        let plan = plan_rebalance(&snapshot, 0, &RebalancePolicy::default());
        let updated = plan.apply(&snapshot);

        let new_key = allocate(&updated, 0).unwrap();
        assert!(new_key.is_valid());
        assert!(new_key < updated[0]);
    }

    #[test]
    fn crowded_prefix_respaces_whole_container() {
        // Worn-down prefix followed by well-spaced members
        let unit = OrderKey::UNIT;
        let mut raw: Vec<i64> = (0..30).collect();
        raw.push(400);
        raw.extend((1..=4).map(|i| i * 10 * unit));
        let snapshot = keys(&raw);

        let plan = plan_rebalance(&snapshot, 0, &RebalancePolicy::default());
        assert_eq!(plan.window, 0..snapshot.len());
        assert_eq!(plan.step, 10 * unit);

        let updated = plan.apply(&snapshot);
        assert!(is_strictly_ordered(&updated));
        assert!(updated.windows(2).all(|pair| pair[1].raw() - pair[0].raw() >= 10 * unit));
        assert!(allocate(&updated, 0).is_ok());
    }

    #[test]
    fn small_preferred_step_never_forces_full_respace() {
        let snapshot = keys(&[0, 100, 101, 102, 103, 104, 1_000, 2_000]);
        let policy = RebalancePolicy { radius: 2, step: 100 };

        let plan = plan_rebalance(&snapshot, 3, &policy);
        assert_eq!(plan.window, 1..5);
    }

    #[test]
    fn changes_skip_untouched_members() {
        let snapshot = keys(&[0, 1]);
        let plan = RebalancePlan {
            window: 0..2,
            keys: keys(&[0, 5]),
            step: 5,
        };
        let changes: Vec<_> = plan.changes(&snapshot).collect();
        assert_eq!(changes, vec![(OrderKey::from_raw(1), OrderKey::from_raw(5))]);
    }
}
