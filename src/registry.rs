//! Record Registry
//!
//! Keyed add/find/remove/list over a head-insertion linked list, with sorted
//! snapshots for binary search.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::error::{RegistryError, Result};
use crate::layout::Layout;
use crate::list::{Iter, OrderedList};
use crate::record::{Field, Record, RecordOrder, SortKey};
use crate::snapshot::{Snapshot, Stamp};
use crate::sort::Algorithm;
use crate::store::RecordStore;

/// Whether the registry holds any records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    Populated,
}

/// Result of adding several records at once
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Number of records added
    pub added: usize,
    /// Records that were refused, with the reason
    pub rejected: Vec<(i64, RegistryError)>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A set of uniquely keyed records
#[derive(Debug)]
pub struct Registry {
    /// Identifies this registry in the snapshots it builds
    instance: u64,
    /// Records, most recently added first
    records: OrderedList<Record>,
    /// Layout every record must satisfy
    layout: Layout,
    /// Algorithm used for snapshots and sorted listings
    algorithm: Algorithm,
    /// Bumped on every mutation
    generation: u64,
    /// Sorted copy for binary search, dropped on mutation
    snapshot: Option<Snapshot>,
}

impl Registry {
    /// Create an empty registry for a layout
    pub fn new(layout: Layout) -> Self {
        Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            records: OrderedList::new(),
            layout,
            algorithm: Algorithm::default(),
            generation: 0,
            snapshot: None,
        }
    }

    /// Set the default sorting algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Create a registry and fill it from a store
    pub fn open(store: &impl RecordStore, layout: Layout) -> Result<Self> {
        let mut registry = Self::new(layout);
        let loaded = registry.hydrate(store.load_all()?);
        debug!(layout = %layout, loaded, "opened registry");
        Ok(registry)
    }

    /// Hand every record to a store
    pub fn save(&self, store: &mut impl RecordStore) -> Result<()> {
        store.persist_all(&self.records())?;
        debug!(layout = %self.layout, count = self.len(), "saved registry");
        Ok(())
    }

    /// Insert loaded records at the front in the order given.
    ///
    /// Records that fail the layout or repeat an id are skipped with a
    /// warning. Returns how many were inserted.
    pub fn hydrate(&mut self, records: impl IntoIterator<Item = Record>) -> usize {
        let mut loaded = 0;
        for record in records {
            let id = record.id();
            match self.add(record) {
                Ok(()) => loaded += 1,
                Err(e) => warn!(id, error = %e, "skipping stored record"),
            }
        }
        loaded
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn state(&self) -> RegistryState {
        if self.is_empty() {
            RegistryState::Empty
        } else {
            RegistryState::Populated
        }
    }

    /// Mutation counter; snapshots taken at an older generation are stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Add a record. Fails with `DuplicateKey` if its id is taken.
    pub fn add(&mut self, record: Record) -> Result<()> {
        self.layout.check(&record)?;
        if self.records.contains(&record.id()) {
            return Err(RegistryError::DuplicateKey { id: record.id() });
        }

        debug!(id = record.id(), name = %record.name, "adding record");
        self.records.insert_front(record);
        self.touch();
        Ok(())
    }

    /// Add several records, continuing past the ones that are refused
    pub fn add_many(&mut self, records: impl IntoIterator<Item = Record>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for record in records {
            let id = record.id();
            match self.add(record) {
                Ok(()) => outcome.added += 1,
                Err(e) => outcome.rejected.push((id, e)),
            }
        }
        outcome
    }

    /// Remove every record matching a predicate, most recent first
    pub fn remove_where(&mut self, pred: impl FnMut(&Record) -> bool) -> Vec<Record> {
        let removed = self.records.remove_all_by(pred);
        if !removed.is_empty() {
            debug!(count = removed.len(), "removed matching records");
            self.touch();
        }
        removed
    }

    /// Remove a record by id and return it
    pub fn remove(&mut self, id: i64) -> Result<Record> {
        let removed = self
            .records
            .remove_by(|r| r.id() == id)
            .ok_or_else(|| RegistryError::not_found(id))?;

        debug!(id, "removed record");
        self.touch();
        Ok(removed)
    }

    /// Replace a record's name and/or attributes. The id never changes.
    pub fn update(
        &mut self,
        id: i64,
        name: Option<String>,
        attributes: Option<Vec<Field>>,
    ) -> Result<&Record> {
        let current = self.records.find(&id).ok_or_else(|| RegistryError::not_found(id))?;

        let mut updated = current.clone();
        if let Some(name) = name {
            updated.name = name;
        }
        if let Some(attributes) = attributes {
            updated.attributes = attributes;
        }
        self.layout.check(&updated)?;

        self.touch();
        let slot = self
            .records
            .find_mut(&id)
            .ok_or_else(|| RegistryError::not_found(id))?;
        *slot = updated;
        debug!(id, "updated record");
        Ok(&*slot)
    }

    /// Look up a record by id with a linear scan of the list
    pub fn find_exact(&self, id: i64) -> Result<&Record> {
        self.records.find(&id).ok_or_else(|| RegistryError::not_found(id))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.records.contains(&id)
    }

    /// One past the largest id in use, or 1 when empty
    pub fn next_id(&self) -> i64 {
        self.iter().map(Record::id).max().map_or(1, |max| max.saturating_add(1))
    }

    /// Records in insertion order, most recent first
    pub fn iter(&self) -> Iter<'_, Record> {
        self.records.iter()
    }

    /// Copy of the records, most recent first
    pub fn records(&self) -> Vec<Record> {
        self.records.to_vec()
    }

    /// Records matching a predicate, most recent first
    pub fn filter(&self, mut pred: impl FnMut(&Record) -> bool) -> Vec<&Record> {
        self.iter().filter(|r| pred(r)).collect()
    }

    /// Sorted copy of the records. The list order is untouched.
    pub fn list_sorted(&self, order: RecordOrder, algorithm: Algorithm) -> Vec<Record> {
        Snapshot::build(self.records(), order, algorithm, self.stamp()).into_records()
    }

    /// Build (or rebuild) the cached snapshot with the registry's algorithm
    pub fn build_snapshot(&mut self, order: RecordOrder) -> &Snapshot {
        self.build_snapshot_with(order, self.algorithm)
    }

    /// Build (or rebuild) the cached snapshot with a specific algorithm
    pub fn build_snapshot_with(&mut self, order: RecordOrder, algorithm: Algorithm) -> &Snapshot {
        let snapshot = Snapshot::build(self.records(), order, algorithm, self.stamp());
        debug!(?order, %algorithm, count = snapshot.len(), "built snapshot");
        self.snapshot.insert(snapshot)
    }

    /// The cached snapshot, if one is current
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Binary search the cached snapshot
    pub fn find_sorted_key(&self, key: &SortKey) -> Result<&Record> {
        let snapshot = self.snapshot.as_ref().ok_or_else(|| {
            RegistryError::PreconditionViolated(
                "no sorted snapshot; build one before searching".to_string(),
            )
        })?;
        self.search_snapshot(snapshot, key)
    }

    /// Binary search a snapshot, refusing one taken from another registry or
    /// before the latest mutation
    pub fn search_snapshot<'a>(&self, snapshot: &'a Snapshot, key: &SortKey) -> Result<&'a Record> {
        if snapshot.stamp().registry != self.instance {
            return Err(RegistryError::PreconditionViolated(
                "snapshot was built from a different registry".to_string(),
            ));
        }
        if snapshot.generation() != self.generation {
            warn!(
                snapshot = snapshot.generation(),
                current = self.generation,
                "search on stale snapshot"
            );
            return Err(RegistryError::PreconditionViolated(format!(
                "snapshot from generation {} is stale (registry is at {})",
                snapshot.generation(),
                self.generation
            )));
        }
        snapshot.find(key)
    }

    fn stamp(&self) -> Stamp {
        Stamp {
            registry: self.instance,
            generation: self.generation,
        }
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.snapshot = None;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}
