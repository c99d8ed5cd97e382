//! Storage seams.
//!
//! Each entity sits behind a capability-based repository. Which engine backs
//! it is an implementation detail; what matters is that doctors and
//! appointments share one relational store while prescriptions live in an
//! independent document store. No call here spans both.

use async_trait::async_trait;
use eyre::Result;

use crate::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, Doctor, DoctorFilter,
    DoctorId, NewAppointment, NewDoctor, Prescription, PrescriptionId,
};

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Inserts a doctor; the store assigns the id.
    async fn create(&self, doctor: NewDoctor) -> Result<Doctor>;

    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>>;

    async fn find_all(&self) -> Result<Vec<Doctor>>;

    async fn filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>>;

    /// Overwrites every field of an existing doctor, slot list included.
    /// The caller's copy wins over any booking made since it was read.
    /// Returns `None` if no row has that id.
    async fn update(&self, doctor: &Doctor) -> Result<Option<Doctor>>;

    /// Replaces the whole slot list while holding the doctor's row lock.
    /// Concurrent replacements are last-writer-wins. Returns `None` if no
    /// row has that id.
    async fn replace_slots(&self, id: DoctorId, times: Vec<String>) -> Result<Option<Doctor>>;

    /// Appends one slot while holding the doctor's row lock, so a booking
    /// that commits first is never undone. Returns `None` if no row has
    /// that id.
    async fn append_slot(&self, id: DoctorId, slot: &str) -> Result<Option<Doctor>>;

    /// Removes the first occurrence of `slot` while holding the doctor's
    /// row lock. Returns `None` if the doctor is absent or does not offer
    /// the slot.
    async fn withdraw_slot(&self, id: DoctorId, slot: &str) -> Result<Option<Doctor>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: DoctorId) -> Result<bool>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>>;

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>>;

    /// Appointments matching every set criterion, ordered by time then id.
    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>>;

    async fn update_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>>;

    async fn delete(&self, id: AppointmentId) -> Result<bool>;

    /// Removes the first occurrence of `slot` from the doctor's list and
    /// inserts the appointment, in one relational transaction.
    ///
    /// Returns `None` without writing anything if the doctor does not exist
    /// or does not offer the slot.
    async fn book(
        &self,
        doctor_id: DoctorId,
        slot: &str,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>>;
}

#[async_trait]
pub trait PrescriptionRepository: Send + Sync {
    /// Mints a fresh opaque id without touching storage.
    fn assign_id(&self) -> PrescriptionId;

    /// Writes the whole document, replacing any document with the same id.
    /// Re-issuing the same call is harmless.
    async fn put(&self, prescription: &Prescription) -> Result<()>;

    async fn find_by_id(&self, id: &PrescriptionId) -> Result<Option<Prescription>>;

    async fn find_all(&self) -> Result<Vec<Prescription>>;

    async fn find_by_appointment(&self, appointment_id: AppointmentId)
    -> Result<Vec<Prescription>>;

    /// Replaces an existing document. Returns `None` if the id is unknown.
    async fn update(&self, prescription: &Prescription) -> Result<Option<Prescription>>;

    async fn delete(&self, id: &PrescriptionId) -> Result<bool>;
}
