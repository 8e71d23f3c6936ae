//! Patients, doctors and appointments
//!
//! Three registries with cross-checks: an appointment may only reference a
//! patient and a doctor that exist, and removing either one cancels their
//! appointments.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::layout::Layout;
use crate::record::{Field, Record};
use crate::registry::Registry;
use crate::store::RecordStore;

const PATIENT_COLUMN: usize = 0;
const DOCTOR_COLUMN: usize = 1;

/// Linked patient, doctor and appointment registries
#[derive(Debug)]
pub struct Clinic {
    patients: Registry,
    doctors: Registry,
    appointments: Registry,
}

impl Clinic {
    pub fn new() -> Self {
        Self {
            patients: Registry::new(Layout::Patient),
            doctors: Registry::new(Layout::Doctor),
            appointments: Registry::new(Layout::Appointment),
        }
    }

    /// Load all three registries. Stored appointments pointing at a missing
    /// patient or doctor are skipped with a warning.
    pub fn open<S: RecordStore>(store_for: impl Fn(Layout) -> S) -> Result<Self> {
        let mut clinic = Self::new();
        clinic.patients.hydrate(store_for(Layout::Patient).load_all()?);
        clinic.doctors.hydrate(store_for(Layout::Doctor).load_all()?);
        for record in store_for(Layout::Appointment).load_all()? {
            let id = record.id();
            if let Err(e) = clinic.insert_appointment(record) {
                warn!(id, error = %e, "skipping stored appointment");
            }
        }
        debug!(
            patients = clinic.patients.len(),
            doctors = clinic.doctors.len(),
            appointments = clinic.appointments.len(),
            "opened clinic"
        );
        Ok(clinic)
    }

    /// Save all three registries
    pub fn save<S: RecordStore>(&self, store_for: impl Fn(Layout) -> S) -> Result<()> {
        for registry in [&self.patients, &self.doctors, &self.appointments] {
            registry.save(&mut store_for(registry.layout()))?;
        }
        Ok(())
    }

    pub fn patients(&self) -> &Registry {
        &self.patients
    }

    pub fn doctors(&self) -> &Registry {
        &self.doctors
    }

    pub fn appointments(&self) -> &Registry {
        &self.appointments
    }

    pub fn register_patient(
        &mut self,
        id: i64,
        name: impl Into<String>,
        dob: NaiveDate,
        gender: impl Into<String>,
    ) -> Result<()> {
        self.patients.add(Record::with_attributes(
            id,
            name,
            vec![Field::Date(dob), Field::Text(gender.into())],
        ))
    }

    pub fn register_doctor(
        &mut self,
        id: i64,
        name: impl Into<String>,
        specialization: impl Into<String>,
    ) -> Result<()> {
        self.doctors.add(Record::with_attributes(
            id,
            name,
            vec![Field::Text(specialization.into())],
        ))
    }

    /// Book an appointment between an existing patient and doctor
    pub fn book_appointment(
        &mut self,
        id: i64,
        patient_id: i64,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<()> {
        self.insert_appointment(Record::with_attributes(
            id,
            format!("P{}-D{}", patient_id, doctor_id),
            vec![Field::Int(patient_id), Field::Int(doctor_id), Field::Date(date)],
        ))
    }

    fn insert_appointment(&mut self, record: Record) -> Result<()> {
        self.appointments.layout().check(&record)?;
        if self.appointments.contains(record.id()) {
            return Err(RegistryError::DuplicateKey { id: record.id() });
        }
        let patient_id = record.int_attribute(PATIENT_COLUMN).unwrap_or_default();
        if !self.patients.contains(patient_id) {
            return Err(RegistryError::UnknownReference {
                kind: "patient",
                id: patient_id,
            });
        }
        let doctor_id = record.int_attribute(DOCTOR_COLUMN).unwrap_or_default();
        if !self.doctors.contains(doctor_id) {
            return Err(RegistryError::UnknownReference {
                kind: "doctor",
                id: doctor_id,
            });
        }
        self.appointments.add(record)
    }

    /// Appointments for a patient, most recent booking first
    pub fn appointments_for_patient(&self, patient_id: i64) -> Vec<&Record> {
        self.appointments
            .filter(|a| a.int_attribute(PATIENT_COLUMN) == Some(patient_id))
    }

    /// Appointments with a doctor, most recent booking first
    pub fn appointments_for_doctor(&self, doctor_id: i64) -> Vec<&Record> {
        self.appointments
            .filter(|a| a.int_attribute(DOCTOR_COLUMN) == Some(doctor_id))
    }

    /// Remove a patient together with their appointments
    pub fn remove_patient(&mut self, id: i64) -> Result<Record> {
        let patient = self.patients.remove(id)?;
        self.cancel_where(PATIENT_COLUMN, id);
        Ok(patient)
    }

    /// Remove a doctor together with their appointments
    pub fn remove_doctor(&mut self, id: i64) -> Result<Record> {
        let doctor = self.doctors.remove(id)?;
        self.cancel_where(DOCTOR_COLUMN, id);
        Ok(doctor)
    }

    pub fn cancel_appointment(&mut self, id: i64) -> Result<Record> {
        self.appointments.remove(id)
    }

    fn cancel_where(&mut self, column: usize, id: i64) {
        let cancelled = self
            .appointments
            .remove_where(|a| a.int_attribute(column) == Some(id));
        if !cancelled.is_empty() {
            info!(count = cancelled.len(), "cancelled appointments");
        }
    }
}

impl Default for Clinic {
    fn default() -> Self {
        Self::new()
    }
}
