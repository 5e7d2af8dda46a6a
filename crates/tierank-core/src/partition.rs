//! Ordered partitions of entities into tiers.
//!
//! A [`Partition`] is an ordered list of non-empty groups; group 0 is the
//! highest tier. Construction validates that every entity `0..n` appears in
//! exactly one group, so downstream scoring never sees an empty or
//! overlapping tier.

use serde::Serialize;

use crate::error::{RankError, Result};

/// An ordered, validated partition of `0..n` into non-empty tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    groups: Vec<Vec<usize>>,
}

impl Partition {
    /// Validate and build a partition of `0..entity_count`.
    ///
    /// Members inside each group are sorted; group order is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidPartition`] if a group is empty, an index
    /// is out of range, an entity appears twice, or an entity is missing.
    pub fn new(groups: Vec<Vec<usize>>, entity_count: usize) -> Result<Self> {
        let mut seen = vec![false; entity_count];
        let mut groups = groups;
        for (tier, group) in groups.iter_mut().enumerate() {
            if group.is_empty() {
                return Err(RankError::InvalidPartition(format!("tier {tier} is empty")));
            }
            for &member in group.iter() {
                if member >= entity_count {
                    return Err(RankError::InvalidPartition(format!(
                        "entity {member} in tier {tier} is out of range for {entity_count} entities"
                    )));
                }
                if std::mem::replace(&mut seen[member], true) {
                    return Err(RankError::InvalidPartition(format!(
                        "entity {member} appears in more than one tier"
                    )));
                }
            }
            group.sort_unstable();
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(RankError::InvalidPartition(format!(
                "entity {missing} is not assigned to any tier"
            )));
        }
        Ok(Self { groups })
    }

    /// Build the partition given by cutting `order` at `splits`.
    ///
    /// `splits` must be strictly increasing positions in `1..order.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidPartition`] for unordered or out-of-range
    /// split points, or if `order` is not a permutation.
    pub fn from_splits(order: &[usize], splits: &[usize]) -> Result<Self> {
        let mut bounds = Vec::with_capacity(splits.len() + 2);
        bounds.push(0);
        bounds.extend_from_slice(splits);
        bounds.push(order.len());
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RankError::InvalidPartition(format!(
                "split points {splits:?} must be strictly increasing inside 1..{}",
                order.len()
            )));
        }
        let groups = bounds.windows(2).map(|w| order[w[0]..w[1]].to_vec()).collect();
        Self::new(groups, order.len())
    }

    /// Tiers in rank order.
    #[must_use]
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Number of tiers.
    #[must_use]
    pub fn tier_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of entities covered.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Tier index of every entity.
    #[must_use]
    pub fn tier_of(&self) -> Vec<usize> {
        let mut tiers = vec![0; self.entity_count()];
        for (tier, group) in self.groups.iter().enumerate() {
            for &member in group {
                tiers[member] = tier;
            }
        }
        tiers
    }

    /// Consume into the raw groups.
    #[must_use]
    pub fn into_groups(self) -> Vec<Vec<usize>> {
        self.groups
    }
}

/// Split `order` into `tiers` contiguous blocks of near-equal size.
///
/// The first `n % tiers` blocks receive one extra member. Serves as a
/// cheap baseline for the exact enumerator.
///
/// # Errors
///
/// Returns [`RankError::InfeasiblePartition`] when `tiers` is zero or
/// exceeds the entity count, and [`RankError::InvalidPartition`] if `order`
/// is not a permutation.
pub fn balanced_partition(order: &[usize], tiers: usize) -> Result<Partition> {
    let n = order.len();
    if tiers == 0 || tiers > n {
        return Err(RankError::InfeasiblePartition { entities: n, tiers });
    }
    let base = n / tiers;
    let extra = n % tiers;
    let mut splits = Vec::with_capacity(tiers - 1);
    let mut cursor = 0;
    for tier in 0..tiers - 1 {
        cursor += base + usize::from(tier < extra);
        splits.push(cursor);
    }
    Partition::from_splits(order, &splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_tier() {
        let err = Partition::new(vec![vec![0, 1], vec![]], 2).expect_err("empty tier");
        assert!(matches!(err, RankError::InvalidPartition(_)));
    }

    #[test]
    fn rejects_duplicate_and_missing_entities() {
        assert!(Partition::new(vec![vec![0], vec![0]], 2).is_err());
        assert!(Partition::new(vec![vec![0]], 2).is_err());
        assert!(Partition::new(vec![vec![0, 5]], 2).is_err());
    }

    #[test]
    fn members_are_sorted_and_order_kept() {
        let p = Partition::new(vec![vec![2, 0], vec![1]], 3).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(p.groups(), [vec![0, 2], vec![1]]);
        assert_eq!(p.tier_of(), vec![0, 1, 0]);
    }

    #[test]
    fn splits_cut_the_order() {
        let p = Partition::from_splits(&[3, 1, 0, 2], &[1, 3]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(p.groups(), [vec![3], vec![0, 1], vec![2]]);
    }

    #[test]
    fn splits_must_be_increasing() {
        assert!(Partition::from_splits(&[0, 1, 2], &[2, 1]).is_err());
        assert!(Partition::from_splits(&[0, 1, 2], &[0]).is_err());
        assert!(Partition::from_splits(&[0, 1, 2], &[3]).is_err());
    }

    #[test]
    fn balanced_sizes_differ_by_at_most_one() {
        let order: Vec<usize> = (0..10).collect();
        let p = balanced_partition(&order, 3).unwrap_or_else(|e| panic!("{e}"));
        let sizes: Vec<usize> = p.groups().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn balanced_rejects_too_many_tiers() {
        let err = balanced_partition(&[0, 1], 3).expect_err("too many tiers");
        assert_eq!(
            err,
            RankError::InfeasiblePartition {
                entities: 2,
                tiers: 3
            }
        );
    }
}
