//! Record Registry
//!
//! Keyed records held in a singly linked list, with interchangeable sorting
//! algorithms and linear/binary search over sorted snapshots.
//!
//! ## Features
//!
//! - **Ordered list**: head insertion, keyed lookup and removal, owned node chain
//! - **Sorting**: bubble, insertion, selection, merge and quick sort over any slice
//! - **Searching**: linear search and inclusive-range binary search
//! - **Registry**: duplicate-checked add/remove/update with sorted snapshots
//! - **Layouts**: item, hospital, patient, doctor, appointment, student and course record kinds
//! - **Linked registries**: clinic appointments, hospital network links and
//!   course enrollments, with reference checks and cascading removal
//! - **CSV stores**: flat-file persistence with a configurable dialect
//!
//! ## Architecture
//!
//! ```text
//! Registry ──owns──> OrderedList<Record> ──owns──> Node -> Node -> ...
//!    │
//!    ├── build_snapshot ──> Snapshot (sorted Vec<Record>, stamped with registry and generation)
//!    │                          └── binary_search_by
//!    └── open / save <──> RecordStore (CsvStore, MemoryStore)
//!
//! Clinic / HospitalNetwork / CourseCatalog ──own──> several Registry values
//! ```

pub mod clinic;
pub mod config;
pub mod courses;
pub mod csv;
pub mod error;
pub mod layout;
pub mod list;
pub mod network;
pub mod record;
pub mod registry;
pub mod search;
pub mod shell;
pub mod snapshot;
pub mod sort;
pub mod stack;
pub mod store;
pub mod validate;

pub use clinic::Clinic;
pub use config::RegistryConfig;
pub use courses::CourseCatalog;
pub use error::{RegistryError, Result};
pub use layout::Layout;
pub use list::OrderedList;
pub use network::HospitalNetwork;
pub use record::{Field, Keyed, Record, RecordOrder, SortKey};
pub use registry::{BatchOutcome, Registry, RegistryState};
pub use snapshot::{Snapshot, Stamp};
pub use sort::Algorithm;
pub use stack::Stack;
pub use store::{CsvStore, MemoryStore, RecordStore};
