//! Hospital network
//!
//! Hospitals joined by undirected links that carry a distance in kilometres.
//! Links live in their own registry (and file); each one gets the next free
//! link id.

use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::layout::Layout;
use crate::record::{Field, Record};
use crate::registry::Registry;
use crate::store::RecordStore;
use crate::validate::validate_range;

const FROM_COLUMN: usize = 0;
const TO_COLUMN: usize = 1;
const DISTANCE_COLUMN: usize = 2;

/// Shortest and longest accepted link, in km
pub const MIN_DISTANCE: f64 = 0.1;
pub const MAX_DISTANCE: f64 = 10_000.0;

/// A link seen from one hospital
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    pub hospital_id: i64,
    pub distance: f64,
}

/// Hospitals and the links between them
#[derive(Debug)]
pub struct HospitalNetwork {
    hospitals: Registry,
    links: Registry,
}

impl HospitalNetwork {
    pub fn new() -> Self {
        Self {
            hospitals: Registry::new(Layout::Hospital),
            links: Registry::new(Layout::Link),
        }
    }

    /// Load hospitals and links. Stored links that fail validation are
    /// skipped with a warning.
    pub fn open<S: RecordStore>(store_for: impl Fn(Layout) -> S) -> Result<Self> {
        let mut network = Self::new();
        network.hospitals.hydrate(store_for(Layout::Hospital).load_all()?);
        for record in store_for(Layout::Link).load_all()? {
            let id = record.id();
            if let Err(e) = network.insert_link(record) {
                warn!(id, error = %e, "skipping stored link");
            }
        }
        debug!(
            hospitals = network.hospitals.len(),
            links = network.links.len(),
            "opened hospital network"
        );
        Ok(network)
    }

    pub fn save<S: RecordStore>(&self, store_for: impl Fn(Layout) -> S) -> Result<()> {
        self.hospitals.save(&mut store_for(Layout::Hospital))?;
        self.links.save(&mut store_for(Layout::Link))
    }

    pub fn hospitals(&self) -> &Registry {
        &self.hospitals
    }

    pub fn links(&self) -> &Registry {
        &self.links
    }

    pub fn add_hospital(
        &mut self,
        id: i64,
        name: impl Into<String>,
        location: impl Into<String>,
        patients: i64,
    ) -> Result<()> {
        self.hospitals.add(Record::with_attributes(
            id,
            name,
            vec![Field::Text(location.into()), Field::Int(patients)],
        ))
    }

    /// Link two existing hospitals. Returns the new link id.
    pub fn link(&mut self, from: i64, to: i64, distance: f64) -> Result<i64> {
        let id = self.links.next_id();
        self.insert_link(Record::with_attributes(
            id,
            format!("H{}-H{}", from, to),
            vec![Field::Int(from), Field::Int(to), Field::Float(distance)],
        ))?;
        info!(from, to, distance, "linked hospitals");
        Ok(id)
    }

    fn insert_link(&mut self, record: Record) -> Result<()> {
        self.links.layout().check(&record)?;
        let from = record.int_attribute(FROM_COLUMN).unwrap_or_default();
        let to = record.int_attribute(TO_COLUMN).unwrap_or_default();

        for id in [from, to] {
            if !self.hospitals.contains(id) {
                return Err(RegistryError::UnknownReference { kind: "hospital", id });
            }
        }
        if from == to {
            return Err(RegistryError::InvalidRecord(format!(
                "hospital {} cannot be linked to itself",
                from
            )));
        }
        if self.find_link(from, to).is_some() {
            return Err(RegistryError::DuplicateLink {
                kind: "link",
                from,
                to,
            });
        }
        self.links.add(record)
    }

    /// The link between two hospitals, in either direction
    pub fn find_link(&self, a: i64, b: i64) -> Option<&Record> {
        self.links
            .iter()
            .find(|link| joins(link, a, b))
    }

    /// Remove the link between two hospitals
    pub fn unlink(&mut self, a: i64, b: i64) -> Result<Record> {
        let id = self
            .find_link(a, b)
            .map(Record::id)
            .ok_or_else(|| RegistryError::NotFound {
                key: format!("link H{}-H{}", a, b),
            })?;
        self.links.remove(id)
    }

    /// Hospitals linked to `id`, nearest first
    pub fn neighbours(&self, id: i64) -> Vec<Neighbour> {
        let mut neighbours: Vec<Neighbour> = self
            .links
            .iter()
            .filter_map(|link| {
                let from = link.int_attribute(FROM_COLUMN)?;
                let to = link.int_attribute(TO_COLUMN)?;
                let other = if from == id {
                    to
                } else if to == id {
                    from
                } else {
                    return None;
                };
                Some(Neighbour {
                    hospital_id: other,
                    distance: distance(link),
                })
            })
            .collect();
        neighbours.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbours
    }

    /// Remove a hospital and every link touching it
    pub fn remove_hospital(&mut self, id: i64) -> Result<Record> {
        let hospital = self.hospitals.remove(id)?;
        let dropped = self.links.remove_where(|link| {
            link.int_attribute(FROM_COLUMN) == Some(id) || link.int_attribute(TO_COLUMN) == Some(id)
        });
        if !dropped.is_empty() {
            info!(id, count = dropped.len(), "removed hospital links");
        }
        Ok(hospital)
    }

    /// Text rendering of the network: hospitals, then one line per link
    pub fn render(&self) -> Vec<String> {
        if self.hospitals.is_empty() {
            return vec!["No hospitals.".to_string()];
        }

        let mut lines = vec!["Hospitals:".to_string()];
        let mut hospitals: Vec<&Record> = self.hospitals.iter().collect();
        hospitals.sort_by_key(|h| h.id());
        lines.extend(hospitals.iter().map(|h| format!("  H{}: {}", h.id(), h.name)));

        lines.push("Connections:".to_string());
        if self.links.is_empty() {
            lines.push("  none".to_string());
        }
        let mut links: Vec<&Record> = self.links.iter().collect();
        links.sort_by_key(|l| l.id());
        for link in links {
            lines.push(format!(
                "  H{} ----({}km)---- H{}",
                link.int_attribute(FROM_COLUMN).unwrap_or_default(),
                distance(link),
                link.int_attribute(TO_COLUMN).unwrap_or_default()
            ));
        }
        lines
    }
}

impl Default for HospitalNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a distance before building a link from user input
pub fn validate_distance(distance: f64) -> Result<f64> {
    validate_range("distance", distance, MIN_DISTANCE, MAX_DISTANCE)
}

fn joins(link: &Record, a: i64, b: i64) -> bool {
    let ends = (link.int_attribute(FROM_COLUMN), link.int_attribute(TO_COLUMN));
    ends == (Some(a), Some(b)) || ends == (Some(b), Some(a))
}

fn distance(link: &Record) -> f64 {
    link.attribute(DISTANCE_COLUMN)
        .and_then(Field::as_float)
        .unwrap_or_default()
}
