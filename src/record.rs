//! Record types and orderings

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Something that can be looked up by a key
pub trait Keyed {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
}

/// A typed attribute value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Field {
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Bool(bool),
}

impl Field {
    fn rank(&self) -> u8 {
        match self {
            Field::Int(_) => 0,
            Field::Float(_) => 1,
            Field::Text(_) => 2,
            Field::Date(_) => 3,
            Field::Bool(_) => 4,
        }
    }

    /// Integer value, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Field::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value, if this is a `Text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Float value, if this is a `Float`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Field::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Field::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Date value, if this is a `Date`
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Field::Date(v) => Some(*v),
            _ => None,
        }
    }
}

// Floats use `total_cmp` so fields (and records) keep a total order.
impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => a.cmp(b),
            (Field::Float(a), Field::Float(b)) => a.total_cmp(b),
            (Field::Text(a), Field::Text(b)) => a.cmp(b),
            (Field::Date(a), Field::Date(b)) => a.cmp(b),
            (Field::Bool(a), Field::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Field {}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Float(v) => write!(f, "{}", v),
            Field::Text(v) => f.write_str(v),
            Field::Date(v) => write!(f, "{}", v.format("%d-%m-%Y")),
            Field::Bool(v) => f.write_str(if *v { "yes" } else { "no" }),
        }
    }
}

/// A uniquely keyed data item stored in a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: i64,
    /// Display name
    pub name: String,
    /// Ordered typed attributes, interpreted through a `Layout`
    pub attributes: Vec<Field>,
}

impl Record {
    /// Create a record without attributes
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Create a record with attributes
    pub fn with_attributes(id: i64, name: impl Into<String>, attributes: Vec<Field>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes,
        }
    }

    /// The record id. Fixed for the lifetime of the record.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Attribute at a column position
    pub fn attribute(&self, index: usize) -> Option<&Field> {
        self.attributes.get(index)
    }

    /// Integer attribute at a column position, such as a referenced id
    pub fn int_attribute(&self, index: usize) -> Option<i64> {
        self.attribute(index).and_then(Field::as_int)
    }
}

impl Keyed for Record {
    type Key = i64;

    fn key(&self) -> &i64 {
        &self.id
    }
}

/// Natural order is by id.
impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.attributes.cmp(&other.attributes))
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)?;
        for field in &self.attributes {
            write!(f, ", {}", field)?;
        }
        Ok(())
    }
}

/// Comparator choice for sorting records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrder {
    #[default]
    Id,
    /// Name only; equal names keep whatever order the algorithm leaves them in
    Name,
}

impl RecordOrder {
    /// Compare two records under this order
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            RecordOrder::Id => a.id.cmp(&b.id),
            RecordOrder::Name => a.name.cmp(&b.name),
        }
    }

    /// Compare a record against a search key under this order
    pub fn compare_key(&self, record: &Record, key: &SortKey) -> Option<Ordering> {
        match (self, key) {
            (RecordOrder::Id, SortKey::Id(id)) => Some(record.id.cmp(id)),
            (RecordOrder::Name, SortKey::Name(name)) => Some(record.name.as_str().cmp(name)),
            _ => None,
        }
    }
}

impl std::str::FromStr for RecordOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(RecordOrder::Id),
            "name" => Ok(RecordOrder::Name),
            other => Err(format!("unknown order '{}', expected id or name", other)),
        }
    }
}

/// A key for searching a sorted snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Id(i64),
    Name(String),
}

impl SortKey {
    /// The order a snapshot must be sorted in to search for this key
    pub fn order(&self) -> RecordOrder {
        match self {
            SortKey::Id(_) => RecordOrder::Id,
            SortKey::Name(_) => RecordOrder::Name,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Id(id) => write!(f, "id {}", id),
            SortKey::Name(name) => write!(f, "name '{}'", name),
        }
    }
}
