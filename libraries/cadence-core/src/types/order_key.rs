//! Fixed-point order keys
//!
//! Keys are integers in a fixed-point space where one logical position is
//! [`OrderKey::UNIT`] raw units. Appends and bulk assignment use whole units;
//! midpoint inserts bisect the raw space. Two keys whose raw values differ by
//! at most one are adjacent with no room between them.
//!
//! Persisted keys are never negative. The storage layer uses negative values
//! as temporary parking slots while renumbering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric value whose ascending sort defines display order within a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::Type), sqlx(transparent))]
pub struct OrderKey(i64);

impl OrderKey {
    /// Raw units per logical position
    pub const UNIT: i64 = 1 << 16;

    /// Baseline key for the first member of an empty container
    pub const ZERO: OrderKey = OrderKey(0);

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Key for the `index`-th slot of a freshly numbered container
    pub fn from_index(index: usize) -> Self {
        Self(index as i64 * Self::UNIT)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Key expressed in logical positions (`1.5` sits halfway between 1 and 2)
    pub fn as_position(self) -> f64 {
        self.0 as f64 / Self::UNIT as f64
    }

    /// Key one logical position after this one
    pub fn next(self) -> Self {
        Self(self.0 + Self::UNIT)
    }

    /// Whether this key can be persisted
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_position())
    }
}
