use tracing::{debug, warn};

use super::{ClinicService, relational};
use crate::errors::{ClinicError, ClinicResult};
use crate::models::{Doctor, DoctorFilter, DoctorId, NewDoctor};
use crate::validation::Validate;

impl ClinicService {
    /// Validates and inserts a doctor. A blank name never reaches the store.
    pub async fn register_doctor(&self, doctor: NewDoctor) -> ClinicResult<Doctor> {
        if let Err(err) = doctor.validate() {
            warn!("Rejected doctor registration: {}", err);
            return Err(err);
        }

        let doctor = self.doctors.create(doctor).await.map_err(relational)?;
        debug!("Registered doctor: id={}", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, id: DoctorId) -> ClinicResult<Doctor> {
        self.doctors
            .find_by_id(id)
            .await
            .map_err(relational)?
            .ok_or_else(|| doctor_not_found(id))
    }

    pub async fn list_doctors(&self) -> ClinicResult<Vec<Doctor>> {
        self.doctors.find_all().await.map_err(relational)
    }

    pub async fn filter_doctors(&self, filter: &DoctorFilter) -> ClinicResult<Vec<Doctor>> {
        self.doctors.filter(filter).await.map_err(relational)
    }

    pub async fn update_doctor(&self, doctor: &Doctor) -> ClinicResult<Doctor> {
        if let Err(err) = doctor.validate() {
            warn!("Rejected update of doctor {}: {}", doctor.id, err);
            return Err(err);
        }

        self.doctors
            .update(doctor)
            .await
            .map_err(relational)?
            .ok_or_else(|| doctor_not_found(doctor.id))
    }

    /// Replaces the doctor's whole slot list with `times`. Two concurrent
    /// replacements resolve last-writer-wins.
    pub async fn set_available_times(
        &self,
        id: DoctorId,
        times: Vec<String>,
    ) -> ClinicResult<Doctor> {
        self.doctors
            .replace_slots(id, times)
            .await
            .map_err(relational)?
            .ok_or_else(|| doctor_not_found(id))
    }

    /// Appends one slot to the end of the list.
    pub async fn add_available_time(&self, id: DoctorId, slot: &str) -> ClinicResult<Doctor> {
        let doctor = self
            .doctors
            .append_slot(id, slot)
            .await
            .map_err(relational)?
            .ok_or_else(|| doctor_not_found(id))?;

        debug!("Added slot to doctor {}: {}", id, slot);
        Ok(doctor)
    }

    /// Removes the first occurrence of `slot`.
    pub async fn withdraw_available_time(
        &self,
        id: DoctorId,
        slot: &str,
    ) -> ClinicResult<Doctor> {
        if let Some(doctor) = self
            .doctors
            .withdraw_slot(id, slot)
            .await
            .map_err(relational)?
        {
            debug!("Withdrew slot from doctor {}: {}", id, slot);
            return Ok(doctor);
        }

        // Distinguish an unknown doctor from an unoffered slot.
        self.get_doctor(id).await?;
        warn!("Slot {} is not offered by doctor {}", slot, id);
        Err(slot_not_offered(id, slot))
    }

    /// Deletes the doctor row. Appointments and prescriptions are untouched.
    pub async fn remove_doctor(&self, id: DoctorId) -> ClinicResult<()> {
        let removed = self.doctors.delete(id).await.map_err(relational)?;
        if !removed {
            return Err(doctor_not_found(id));
        }

        debug!("Removed doctor: id={}", id);
        Ok(())
    }
}

fn doctor_not_found(id: DoctorId) -> ClinicError {
    ClinicError::NotFound(format!("Doctor with ID {} not found", id))
}

/// The doctor exists but the requested slot is not on their list.
pub(super) fn slot_not_offered(id: DoctorId, slot: &str) -> ClinicError {
    ClinicError::Validation(format!("Doctor {} does not offer slot {}", id, slot))
}
