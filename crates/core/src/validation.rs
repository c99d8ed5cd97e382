//! Boundary validation, configured per entity.
//!
//! Checks run before a record is handed to a store. Stored data is never
//! revalidated on read.

use crate::errors::{ClinicError, ClinicResult};
use crate::models::{Doctor, NewAppointment, NewDoctor, NewPrescription, Prescription};

pub trait Validate {
    fn validate(&self) -> ClinicResult<()>;
}

fn require_non_blank(field: &str, value: &str) -> ClinicResult<()> {
    if value.trim().is_empty() {
        return Err(ClinicError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

impl Validate for NewDoctor {
    fn validate(&self) -> ClinicResult<()> {
        require_non_blank("name", &self.name)
    }
}

impl Validate for Doctor {
    fn validate(&self) -> ClinicResult<()> {
        require_non_blank("name", &self.name)
    }
}

impl Validate for NewAppointment {
    fn validate(&self) -> ClinicResult<()> {
        require_non_blank("patientName", &self.patient_name)
    }
}

// Prescriptions carry no constraints; partial documents are accepted as-is.
impl Validate for NewPrescription {
    fn validate(&self) -> ClinicResult<()> {
        Ok(())
    }
}

impl Validate for Prescription {
    fn validate(&self) -> ClinicResult<()> {
        Ok(())
    }
}
