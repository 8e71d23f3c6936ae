//! Student course enrollment

use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::layout::Layout;
use crate::record::{Field, Record};
use crate::registry::Registry;
use crate::store::RecordStore;

const STUDENT_COLUMN: usize = 0;
const COURSE_COLUMN: usize = 1;
const AVAILABLE_COLUMN: usize = 0;

/// Students, courses and the enrollments between them
#[derive(Debug)]
pub struct CourseCatalog {
    students: Registry,
    courses: Registry,
    enrollments: Registry,
}

impl CourseCatalog {
    pub fn new() -> Self {
        Self {
            students: Registry::new(Layout::Student),
            courses: Registry::new(Layout::Course),
            enrollments: Registry::new(Layout::Enrollment),
        }
    }

    /// Load all three registries. Stored enrollments for a missing student or
    /// course are skipped with a warning; closed courses keep their existing
    /// enrollments.
    pub fn open<S: RecordStore>(store_for: impl Fn(Layout) -> S) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.students.hydrate(store_for(Layout::Student).load_all()?);
        catalog.courses.hydrate(store_for(Layout::Course).load_all()?);
        for record in store_for(Layout::Enrollment).load_all()? {
            let id = record.id();
            if let Err(e) = catalog.insert_enrollment(record, false) {
                warn!(id, error = %e, "skipping stored enrollment");
            }
        }
        debug!(
            students = catalog.students.len(),
            courses = catalog.courses.len(),
            enrollments = catalog.enrollments.len(),
            "opened course catalog"
        );
        Ok(catalog)
    }

    pub fn save<S: RecordStore>(&self, store_for: impl Fn(Layout) -> S) -> Result<()> {
        for registry in [&self.students, &self.courses, &self.enrollments] {
            registry.save(&mut store_for(registry.layout()))?;
        }
        Ok(())
    }

    pub fn students(&self) -> &Registry {
        &self.students
    }

    pub fn courses(&self) -> &Registry {
        &self.courses
    }

    pub fn enrollments(&self) -> &Registry {
        &self.enrollments
    }

    pub fn add_student(&mut self, id: i64, name: impl Into<String>) -> Result<()> {
        self.students.add(Record::new(id, name))
    }

    pub fn add_course(&mut self, id: i64, name: impl Into<String>, available: bool) -> Result<()> {
        self.courses
            .add(Record::with_attributes(id, name, vec![Field::Bool(available)]))
    }

    /// Open or close a course for new enrollments
    pub fn set_available(&mut self, course_id: i64, available: bool) -> Result<()> {
        self.courses
            .update(course_id, None, Some(vec![Field::Bool(available)]))?;
        Ok(())
    }

    /// Enroll a student in an open course. Returns the enrollment id.
    pub fn enroll(&mut self, student_id: i64, course_id: i64) -> Result<i64> {
        let id = self.enrollments.next_id();
        self.insert_enrollment(
            Record::with_attributes(
                id,
                format!("S{}-C{}", student_id, course_id),
                vec![Field::Int(student_id), Field::Int(course_id)],
            ),
            true,
        )?;
        info!(student_id, course_id, "enrolled student");
        Ok(id)
    }

    fn insert_enrollment(&mut self, record: Record, require_open: bool) -> Result<()> {
        self.enrollments.layout().check(&record)?;
        let student_id = record.int_attribute(STUDENT_COLUMN).unwrap_or_default();
        let course_id = record.int_attribute(COURSE_COLUMN).unwrap_or_default();

        if !self.students.contains(student_id) {
            return Err(RegistryError::UnknownReference {
                kind: "student",
                id: student_id,
            });
        }
        let course = self
            .courses
            .find_exact(course_id)
            .map_err(|_| RegistryError::UnknownReference {
                kind: "course",
                id: course_id,
            })?;
        if require_open && !is_available(course) {
            return Err(RegistryError::CourseUnavailable { id: course_id });
        }
        if self.enrollment(student_id, course_id).is_some() {
            return Err(RegistryError::DuplicateLink {
                kind: "enrollment",
                from: student_id,
                to: course_id,
            });
        }
        self.enrollments.add(record)
    }

    fn enrollment(&self, student_id: i64, course_id: i64) -> Option<&Record> {
        self.enrollments.iter().find(|e| {
            e.int_attribute(STUDENT_COLUMN) == Some(student_id)
                && e.int_attribute(COURSE_COLUMN) == Some(course_id)
        })
    }

    /// Drop a student from a course
    pub fn withdraw(&mut self, student_id: i64, course_id: i64) -> Result<Record> {
        let id = self
            .enrollment(student_id, course_id)
            .map(Record::id)
            .ok_or_else(|| RegistryError::NotFound {
                key: format!("enrollment S{}-C{}", student_id, course_id),
            })?;
        self.enrollments.remove(id)
    }

    /// Courses a student is enrolled in, in enrollment order
    pub fn courses_of(&self, student_id: i64) -> Vec<&Record> {
        let mut ids: Vec<i64> = self
            .enrollments
            .iter()
            .filter(|e| e.int_attribute(STUDENT_COLUMN) == Some(student_id))
            .filter_map(|e| e.int_attribute(COURSE_COLUMN))
            .collect();
        ids.reverse();
        ids.into_iter()
            .filter_map(|id| self.courses.find_exact(id).ok())
            .collect()
    }

    /// Students enrolled in a course, most recent first
    pub fn students_in(&self, course_id: i64) -> Vec<&Record> {
        self.enrollments
            .iter()
            .filter(|e| e.int_attribute(COURSE_COLUMN) == Some(course_id))
            .filter_map(|e| e.int_attribute(STUDENT_COLUMN))
            .filter_map(|id| self.students.find_exact(id).ok())
            .collect()
    }

    /// Remove a student and their enrollments
    pub fn remove_student(&mut self, id: i64) -> Result<Record> {
        let student = self.students.remove(id)?;
        self.enrollments
            .remove_where(|e| e.int_attribute(STUDENT_COLUMN) == Some(id));
        Ok(student)
    }

    /// Remove a course and its enrollments
    pub fn remove_course(&mut self, id: i64) -> Result<Record> {
        let course = self.courses.remove(id)?;
        self.enrollments
            .remove_where(|e| e.int_attribute(COURSE_COLUMN) == Some(id));
        Ok(course)
    }

    /// One line per student: name followed by their course names
    pub fn render(&self) -> Vec<String> {
        if self.students.is_empty() {
            return vec!["No students.".to_string()];
        }
        self.students
            .iter()
            .map(|student| {
                let courses: Vec<&str> = self
                    .courses_of(student.id())
                    .into_iter()
                    .map(|c| c.name.as_str())
                    .collect();
                format!("{}: {} [{}]", student.id(), student.name, courses.join(", "))
            })
            .collect()
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn is_available(course: &Record) -> bool {
    course
        .attribute(AVAILABLE_COLUMN)
        .and_then(Field::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CsvStore;
    use tempfile::tempdir;

    fn catalog() -> CourseCatalog {
        let mut catalog = CourseCatalog::new();
        catalog.add_student(1, "Aline").unwrap();
        catalog.add_student(2, "Eric").unwrap();
        catalog.add_course(10, "Math", true).unwrap();
        catalog.add_course(11, "Physics", true).unwrap();
        catalog.add_course(12, "Chemistry", false).unwrap();
        catalog
    }

    fn names(records: Vec<&Record>) -> Vec<&str> {
        records.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_enroll_in_open_courses() {
        let mut catalog = catalog();
        catalog.enroll(1, 11).unwrap();
        catalog.enroll(1, 10).unwrap();
        catalog.enroll(2, 10).unwrap();

        assert_eq!(names(catalog.courses_of(1)), vec!["Physics", "Math"]);
        assert_eq!(names(catalog.students_in(10)), vec!["Eric", "Aline"]);
    }

    #[test]
    fn test_enroll_rejections() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.enroll(1, 12),
            Err(RegistryError::CourseUnavailable { id: 12 })
        ));
        assert!(matches!(
            catalog.enroll(1, 99),
            Err(RegistryError::UnknownReference { kind: "course", id: 99 })
        ));
        assert!(matches!(
            catalog.enroll(7, 10),
            Err(RegistryError::UnknownReference { kind: "student", id: 7 })
        ));

        catalog.enroll(1, 10).unwrap();
        assert!(matches!(
            catalog.enroll(1, 10),
            Err(RegistryError::DuplicateLink { kind: "enrollment", .. })
        ));
        assert_eq!(catalog.enrollments().len(), 1);
    }

    #[test]
    fn test_reopening_a_course() {
        let mut catalog = catalog();
        catalog.set_available(12, true).unwrap();
        catalog.enroll(2, 12).unwrap();
        catalog.set_available(12, false).unwrap();
        assert_eq!(names(catalog.courses_of(2)), vec!["Chemistry"]);
    }

    #[test]
    fn test_withdraw_and_cascades() {
        let mut catalog = catalog();
        catalog.enroll(1, 10).unwrap();
        catalog.enroll(2, 10).unwrap();
        catalog.enroll(2, 11).unwrap();

        catalog.withdraw(2, 11).unwrap();
        assert!(matches!(catalog.withdraw(2, 11), Err(RegistryError::NotFound { .. })));

        catalog.remove_course(10).unwrap();
        assert!(catalog.enrollments().is_empty());

        catalog.enroll(1, 11).unwrap();
        catalog.remove_student(1).unwrap();
        assert!(catalog.enrollments().is_empty());
    }

    #[test]
    fn test_render() {
        let mut catalog = catalog();
        catalog.enroll(1, 10).unwrap();
        assert_eq!(catalog.render(), vec!["2: Eric []", "1: Aline [Math]"]);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempdir().unwrap();
        let store_for = |layout: Layout| CsvStore::new(dir.path().join(layout.file_name()), layout);

        let mut catalog = catalog();
        catalog.enroll(1, 10).unwrap();
        catalog.set_available(10, false).unwrap();
        catalog.save(store_for).unwrap();

        let courses = std::fs::read_to_string(dir.path().join("courses.csv")).unwrap();
        assert!(courses.starts_with("id,name,available\n10,Math,no\n"));

        let reopened = CourseCatalog::open(store_for).unwrap();
        assert_eq!(reopened.enrollments().len(), 1);
        assert_eq!(names(reopened.courses_of(1)), vec!["Math"]);
    }
}
