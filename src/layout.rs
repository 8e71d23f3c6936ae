//! Record layouts
//!
//! A layout names the attribute columns of a record kind and how each column
//! is parsed and validated. The id and name columns are implicit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::record::{Field, Record};
use crate::validate::{validate_date, validate_flag, validate_range};

/// How a column is typed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Integer within an inclusive range
    Int { min: i64, max: i64 },
    /// Float within an inclusive range
    Float { min: f64, max: f64 },
    Text,
    Date,
    /// yes/no
    Flag,
}

/// A named attribute column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn column(name: &'static str, kind: FieldKind) -> Column {
    Column { name, kind }
}

const ID_RANGE: FieldKind = FieldKind::Int { min: 1, max: i64::MAX };

const ITEM: &[Column] = &[
    column("quantity", FieldKind::Int { min: 0, max: i64::MAX }),
    column("registered", FieldKind::Date),
];

const HOSPITAL: &[Column] = &[
    column("location", FieldKind::Text),
    column("patients", FieldKind::Int { min: 0, max: 10_000 }),
];

const LINK: &[Column] = &[
    column("from_id", ID_RANGE),
    column("to_id", ID_RANGE),
    column("distance", FieldKind::Float { min: 0.1, max: 10_000.0 }),
];

const PATIENT: &[Column] = &[
    column("dob", FieldKind::Date),
    column("gender", FieldKind::Text),
];

const DOCTOR: &[Column] = &[column("specialization", FieldKind::Text)];

const APPOINTMENT: &[Column] = &[
    column("patient_id", ID_RANGE),
    column("doctor_id", ID_RANGE),
    column("date", FieldKind::Date),
];

const COURSE: &[Column] = &[column("available", FieldKind::Flag)];

const ENROLLMENT: &[Column] = &[column("student_id", ID_RANGE), column("course_id", ID_RANGE)];

/// Built-in record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Id and name only
    #[default]
    Plain,
    Item,
    Hospital,
    /// Distance between two hospitals
    Link,
    Patient,
    Doctor,
    Appointment,
    Student,
    Course,
    Enrollment,
}

impl Layout {
    pub const ALL: [Layout; 10] = [
        Layout::Plain,
        Layout::Item,
        Layout::Hospital,
        Layout::Link,
        Layout::Patient,
        Layout::Doctor,
        Layout::Appointment,
        Layout::Student,
        Layout::Course,
        Layout::Enrollment,
    ];

    /// Attribute columns after id and name
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Layout::Plain | Layout::Student => &[],
            Layout::Item => ITEM,
            Layout::Hospital => HOSPITAL,
            Layout::Link => LINK,
            Layout::Patient => PATIENT,
            Layout::Doctor => DOCTOR,
            Layout::Appointment => APPOINTMENT,
            Layout::Course => COURSE,
            Layout::Enrollment => ENROLLMENT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Layout::Plain => "plain",
            Layout::Item => "item",
            Layout::Hospital => "hospital",
            Layout::Link => "link",
            Layout::Patient => "patient",
            Layout::Doctor => "doctor",
            Layout::Appointment => "appointment",
            Layout::Student => "student",
            Layout::Course => "course",
            Layout::Enrollment => "enrollment",
        }
    }

    /// Default data file name for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            Layout::Plain => "records.csv",
            Layout::Item => "items.csv",
            Layout::Hospital => "hospitals.csv",
            Layout::Link => "hospital_connections.csv",
            Layout::Patient => "patients.csv",
            Layout::Doctor => "doctors.csv",
            Layout::Appointment => "appointments.csv",
            Layout::Student => "students.csv",
            Layout::Course => "courses.csv",
            Layout::Enrollment => "enrollments.csv",
        }
    }

    /// Command that manages this kind together with the kinds it is linked to
    pub fn owner(&self) -> Option<&'static str> {
        match self {
            Layout::Hospital | Layout::Link => Some("network"),
            Layout::Patient | Layout::Doctor | Layout::Appointment => Some("clinic"),
            Layout::Student | Layout::Course | Layout::Enrollment => Some("courses"),
            Layout::Plain | Layout::Item => None,
        }
    }

    /// Whether records of this kind point at records of another kind
    pub fn has_references(&self) -> bool {
        matches!(self, Layout::Link | Layout::Appointment | Layout::Enrollment)
    }

    /// Whether records of another kind point at records of this kind
    pub fn is_referenced(&self) -> bool {
        matches!(
            self,
            Layout::Hospital | Layout::Patient | Layout::Doctor | Layout::Student | Layout::Course
        )
    }

    /// Position of a named attribute column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| c.name == name)
    }

    /// Full header row, including id and name
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["id", "name"];
        headers.extend(self.columns().iter().map(|c| c.name));
        headers
    }

    /// Parse raw attribute text into typed fields
    pub fn parse_fields(&self, raw: &[&str]) -> Result<Vec<Field>> {
        let columns = self.columns();
        if raw.len() != columns.len() {
            return Err(RegistryError::InvalidRecord(format!(
                "{} records take {} attributes ({}), got {}",
                self.name(),
                columns.len(),
                columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
                raw.len()
            )));
        }

        columns
            .iter()
            .zip(raw)
            .map(|(column, text)| parse_field(column, text))
            .collect()
    }

    /// Check that a record's attributes have the types and ranges this layout requires
    pub fn check(&self, record: &Record) -> Result<()> {
        let columns = self.columns();
        if record.attributes.len() != columns.len() {
            return Err(RegistryError::InvalidRecord(format!(
                "record {} has {} attributes, {} layout expects {}",
                record.id(),
                record.attributes.len(),
                self.name(),
                columns.len()
            )));
        }

        for (column, field) in columns.iter().zip(&record.attributes) {
            match (column.kind, field) {
                (FieldKind::Int { min, max }, Field::Int(v)) => {
                    validate_range(column.name, *v, min, max)?;
                }
                (FieldKind::Float { min, max }, Field::Float(v)) => {
                    validate_range(column.name, *v, min, max)?;
                }
                (FieldKind::Text, Field::Text(_))
                | (FieldKind::Date, Field::Date(_))
                | (FieldKind::Flag, Field::Bool(_)) => {}
                _ => {
                    return Err(RegistryError::InvalidRecord(format!(
                        "column {} has the wrong type",
                        column.name
                    )))
                }
            }
        }
        Ok(())
    }
}

fn parse_field(column: &Column, text: &str) -> Result<Field> {
    let text = text.trim();
    let not_a_number = || {
        RegistryError::InvalidRecord(format!("{} must be a number, got '{}'", column.name, text))
    };
    match column.kind {
        FieldKind::Int { min, max } => {
            let value = text.parse::<i64>().map_err(|_| not_a_number())?;
            validate_range(column.name, value, min, max).map(Field::Int)
        }
        FieldKind::Float { min, max } => {
            let value = text.parse::<f64>().map_err(|_| not_a_number())?;
            validate_range(column.name, value, min, max).map(Field::Float)
        }
        FieldKind::Text => {
            if text.is_empty() {
                return Err(RegistryError::InvalidRecord(format!(
                    "{} cannot be empty",
                    column.name
                )));
            }
            Ok(Field::Text(text.to_string()))
        }
        FieldKind::Date => validate_date(text).map(Field::Date),
        FieldKind::Flag => validate_flag(column.name, text).map(Field::Bool),
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layout '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_item_fields() {
        let fields = Layout::Item.parse_fields(&["5", "01-05-2025"]).unwrap();
        assert_eq!(fields[0], Field::Int(5));
        assert_eq!(
            fields[1],
            Field::Date(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        let err = Layout::Doctor.parse_fields(&[]).unwrap_err();
        assert!(err.to_string().contains("specialization"));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Layout::Hospital.parse_fields(&["Kigali", "10001"]).is_err());
        assert!(Layout::Item.parse_fields(&["-1", "01-05-2025"]).is_err());
        assert!(Layout::Item.parse_fields(&["many", "01-05-2025"]).is_err());
    }

    #[test]
    fn test_parse_link_distance() {
        let fields = Layout::Link.parse_fields(&["1", "2", "12.5"]).unwrap();
        assert_eq!(fields[2], Field::Float(12.5));
        assert!(Layout::Link.parse_fields(&["1", "2", "0"]).is_err());
        assert!(Layout::Link.parse_fields(&["1", "2", "10000.5"]).is_err());
        assert!(Layout::Link.parse_fields(&["1", "2", "far"]).is_err());
    }

    #[test]
    fn test_parse_course_flag() {
        assert_eq!(Layout::Course.parse_fields(&["no"]).unwrap(), vec![Field::Bool(false)]);
        assert!(Layout::Course.parse_fields(&["soon"]).is_err());
    }

    #[test]
    fn test_check_record() {
        let ok = Record::with_attributes(1, "Dr. Who", vec![Field::Text("Time".into())]);
        assert!(Layout::Doctor.check(&ok).is_ok());

        let bad = Record::with_attributes(1, "Dr. Who", vec![Field::Int(3)]);
        assert!(Layout::Doctor.check(&bad).is_err());
        assert!(Layout::Plain.check(&Record::new(2, "x")).is_ok());

        let far = Record::with_attributes(
            3,
            "H1-H2",
            vec![Field::Int(1), Field::Int(2), Field::Float(20_000.0)],
        );
        assert!(Layout::Link.check(&far).is_err());
    }

    #[test]
    fn test_headers_and_lookup() {
        assert_eq!(
            Layout::Appointment.headers(),
            vec!["id", "name", "patient_id", "doctor_id", "date"]
        );
        assert_eq!(Layout::Appointment.column_index("doctor_id"), Some(1));
        assert_eq!("Hospital".parse::<Layout>().unwrap(), Layout::Hospital);
        assert_eq!(Layout::Link.file_name(), "hospital_connections.csv");
    }

    #[test]
    fn test_linked_kinds() {
        for layout in Layout::ALL {
            let linked = layout.has_references() || layout.is_referenced();
            assert_eq!(linked, layout.owner().is_some(), "{}", layout);
        }
    }
}
