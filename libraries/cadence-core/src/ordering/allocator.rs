use crate::types::OrderKey;
use thiserror::Error;

/// No key exists strictly between the neighbours of the requested index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no room for a key at index {index}")]
pub struct Exhausted {
    pub index: usize,
}

/// Compute a key for a new member inserted at `index` among `keys`
///
/// `keys` must be sorted ascending with no duplicates.
///
/// - empty container: [`OrderKey::ZERO`]
/// - `index >= keys.len()`: one logical unit past the last key
/// - `index == 0`: one unit before the first key while that stays positive,
///   otherwise halfway between zero and the first key
/// - otherwise: the midpoint of the two neighbours
///
/// Returns [`Exhausted`] when the neighbours are adjacent in raw units.
pub fn allocate(keys: &[OrderKey], index: usize) -> Result<OrderKey, Exhausted> {
    let Some(last) = keys.last() else {
        return Ok(OrderKey::ZERO);
    };

    if index >= keys.len() {
        return Ok(last.next());
    }

    if index == 0 {
        let first = keys[0].raw();
        let before = first - OrderKey::UNIT;
        if before > 0 {
            return Ok(OrderKey::from_raw(before));
        }
        // Halfway to zero keeps prepends strictly positive
        if first >= 2 {
            return Ok(OrderKey::from_raw(first / 2));
        }
        return Err(Exhausted { index });
    }

    let lower = keys[index - 1].raw();
    let upper = keys[index].raw();
    if upper - lower <= 1 {
        return Err(Exhausted { index });
    }

    Ok(OrderKey::from_raw(lower + (upper - lower) / 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[i64]) -> Vec<OrderKey> {
        raw.iter().copied().map(OrderKey::from_raw).collect()
    }

    #[test]
    fn empty_container_gets_baseline() {
        assert_eq!(allocate(&[], 0), Ok(OrderKey::ZERO));
        assert_eq!(allocate(&[], 7), Ok(OrderKey::ZERO));
    }

    #[test]
    fn append_is_one_unit_past_last() {
        let existing = [OrderKey::from_index(0), OrderKey::from_index(4)];
        assert_eq!(allocate(&existing, 2), Ok(OrderKey::from_index(5)));
        assert_eq!(allocate(&existing, 99), Ok(OrderKey::from_index(5)));
    }

    #[test]
    fn middle_insert_takes_midpoint() {
        let existing = [OrderKey::from_index(0), OrderKey::from_index(1)];
        let key = allocate(&existing, 1).unwrap();
        assert_eq!(key.raw(), OrderKey::UNIT / 2);
        assert_eq!(key.to_string(), "0.5");
    }

    #[test]
    fn adjacent_neighbours_are_exhausted() {
        assert_eq!(allocate(&keys(&[10, 11]), 1), Err(Exhausted { index: 1 }));
        assert_eq!(allocate(&keys(&[10, 12]), 1), Ok(OrderKey::from_raw(11)));
    }

    #[test]
    fn prepend_steps_back_one_unit_when_positive() {
        let existing = [OrderKey::from_index(3)];
        assert_eq!(allocate(&existing, 0), Ok(OrderKey::from_index(2)));
    }

    #[test]
    fn prepend_bisects_towards_zero_when_unit_step_is_not_positive() {
        let existing = [OrderKey::from_index(1), OrderKey::from_index(2)];
        assert_eq!(allocate(&existing, 0), Ok(OrderKey::from_raw(OrderKey::UNIT / 2)));
    }

    #[test]
    fn prepend_before_zero_or_one_is_exhausted() {
        assert_eq!(allocate(&keys(&[0, 5]), 0), Err(Exhausted { index: 0 }));
        assert_eq!(allocate(&keys(&[1, 5]), 0), Err(Exhausted { index: 0 }));
        assert_eq!(allocate(&keys(&[2, 5]), 0), Ok(OrderKey::from_raw(1)));
    }
}
