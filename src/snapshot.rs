//! Sorted snapshots of a registry
//!
//! A snapshot is a sorted copy of the registry contents, used for binary
//! search. It is stamped with the registry it was built from and that
//! registry's generation; any registry mutation makes it stale.

use serde::Serialize;

use crate::error::{RegistryError, Result};
use crate::record::{Record, RecordOrder, SortKey};
use crate::search::binary_search_by;
use crate::sort::Algorithm;

/// Which registry state a snapshot was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stamp {
    /// Process-unique registry instance
    pub registry: u64,
    /// Registry generation at build time
    pub generation: u64,
}

/// A disposable sorted copy of registry records
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    order: RecordOrder,
    algorithm: Algorithm,
    stamp: Stamp,
    records: Vec<Record>,
}

impl Snapshot {
    /// Sort `records` and wrap them as a snapshot of the stamped state
    pub(crate) fn build(
        mut records: Vec<Record>,
        order: RecordOrder,
        algorithm: Algorithm,
        stamp: Stamp,
    ) -> Self {
        algorithm.sort_by(&mut records, |a, b| order.compare(a, b));
        Self {
            order,
            algorithm,
            stamp,
            records,
        }
    }

    pub fn order(&self) -> RecordOrder {
        self.order
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Registry generation this snapshot was taken at
    pub fn generation(&self) -> u64 {
        self.stamp.generation
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the snapshot, keeping the sorted records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Binary search for a key.
    ///
    /// The key must match the order the snapshot was sorted by. With
    /// duplicate names any one of the matching records may be returned.
    pub fn find(&self, key: &SortKey) -> Result<&Record> {
        if key.order() != self.order {
            return Err(RegistryError::PreconditionViolated(format!(
                "snapshot is sorted by {:?}, cannot search for {}",
                self.order, key
            )));
        }
        if self.records.is_empty() {
            return Err(RegistryError::EmptyContainer);
        }

        let high = self.records.len() - 1;
        binary_search_by(&self.records, 0, high, |record| {
            self.order
                .compare_key(record, key)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|index| &self.records[index])
        .ok_or_else(|| RegistryError::NotFound {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new(5, "Eve"),
            Record::new(3, "Carol"),
            Record::new(8, "Heidi"),
            Record::new(1, "Alice"),
        ]
    }

    #[test]
    fn test_build_sorts_by_order() {
        let snap = Snapshot::build(sample(), RecordOrder::Id, Algorithm::Quick, Stamp::default());
        let ids: Vec<i64> = snap.records().iter().map(Record::id).collect();
        assert_eq!(ids, vec![1, 3, 5, 8]);
    }

    #[test]
    fn test_find_by_name() {
        let snap = Snapshot::build(sample(), RecordOrder::Name, Algorithm::Merge, Stamp::default());
        assert_eq!(snap.find(&SortKey::Name("Heidi".into())).unwrap().id(), 8);
        assert!(matches!(
            snap.find(&SortKey::Name("Bob".into())),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_with_mismatched_key() {
        let snap = Snapshot::build(sample(), RecordOrder::Name, Algorithm::Merge, Stamp::default());
        assert!(matches!(
            snap.find(&SortKey::Id(3)),
            Err(RegistryError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn test_find_in_empty_snapshot() {
        let snap = Snapshot::build(Vec::new(), RecordOrder::Id, Algorithm::Bubble, Stamp::default());
        assert!(matches!(
            snap.find(&SortKey::Id(1)),
            Err(RegistryError::EmptyContainer)
        ));
    }
}
