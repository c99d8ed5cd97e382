use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::doctor::slot_not_offered;
use super::{ClinicService, relational};
use crate::errors::{ClinicError, ClinicResult};
use crate::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, DoctorId, NewAppointment,
};
use crate::validation::Validate;

impl ClinicService {
    /// Books `slot` with a doctor.
    ///
    /// Booking removes one occurrence of the slot string from the doctor's
    /// list; that removal is the only record that the slot is taken.
    pub async fn book_appointment(
        &self,
        doctor_id: DoctorId,
        slot: &str,
        patient_name: &str,
        appointment_time: DateTime<Utc>,
    ) -> ClinicResult<Appointment> {
        let appointment = NewAppointment {
            doctor_id,
            patient_name: patient_name.to_string(),
            appointment_time,
        };
        appointment.validate()?;

        // Distinguish an unknown doctor from an unavailable slot.
        self.get_doctor(doctor_id).await?;

        let booked = self
            .appointments
            .book(doctor_id, slot, appointment)
            .await
            .map_err(relational)?;

        match booked {
            Some(appointment) => {
                debug!(
                    "Booked appointment: id={}, doctor_id={}",
                    appointment.id, doctor_id
                );
                Ok(appointment)
            }
            None => {
                warn!("Slot {} is not offered by doctor {}", slot, doctor_id);
                Err(slot_not_offered(doctor_id, slot))
            }
        }
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> ClinicResult<Appointment> {
        self.appointments
            .find_by_id(id)
            .await
            .map_err(relational)?
            .ok_or_else(|| ClinicError::NotFound(format!("Appointment with ID {} not found", id)))
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> ClinicResult<Vec<Appointment>> {
        self.appointments
            .find_by_doctor(doctor_id)
            .await
            .map_err(relational)
    }

    /// Appointments matching `filter`, e.g. one day's schedule or a patient's history.
    pub async fn filter_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> ClinicResult<Vec<Appointment>> {
        self.appointments.search(filter).await.map_err(relational)
    }

    pub async fn update_appointment_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> ClinicResult<Appointment> {
        self.appointments
            .update_status(id, status)
            .await
            .map_err(relational)?
            .ok_or_else(|| ClinicError::NotFound(format!("Appointment with ID {} not found", id)))
    }

    /// Deletes the appointment row. Prescriptions that reference it are left
    /// in place and resolve as missing from then on.
    pub async fn delete_appointment(&self, id: AppointmentId) -> ClinicResult<()> {
        let removed = self.appointments.delete(id).await.map_err(relational)?;
        if !removed {
            return Err(ClinicError::NotFound(format!(
                "Appointment with ID {} not found",
                id
            )));
        }

        debug!("Deleted appointment: id={}", id);
        Ok(())
    }
}
