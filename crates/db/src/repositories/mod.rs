//! PostgreSQL-backed stores.
//!
//! Query functions take a pool directly. `PgRelationalStore` and
//! `PgDocumentStore` adapt them to the repository traits so the service
//! never sees which engine is behind a seam.

pub mod appointment;
pub mod doctor;
pub mod prescription;

use async_trait::async_trait;
use eyre::Result;
use smartclinic_core::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, Doctor, DoctorFilter,
    DoctorId, NewAppointment, NewDoctor, Prescription, PrescriptionId,
};
use smartclinic_core::repositories::{
    AppointmentRepository, DoctorRepository, PrescriptionRepository,
};

use crate::DbPool;

/// Doctors and appointments, sharing one relational database.
#[derive(Clone)]
pub struct PgRelationalStore {
    pool: DbPool,
}

impl PgRelationalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Prescriptions, stored as JSONB documents.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DoctorRepository for PgRelationalStore {
    async fn create(&self, doctor: NewDoctor) -> Result<Doctor> {
        doctor::create_doctor(&self.pool, &doctor).await
    }

    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>> {
        doctor::get_doctor_by_id(&self.pool, id).await
    }

    async fn find_all(&self) -> Result<Vec<Doctor>> {
        doctor::get_all_doctors(&self.pool).await
    }

    async fn filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
        doctor::filter_doctors(&self.pool, filter).await
    }

    async fn update(&self, doctor: &Doctor) -> Result<Option<Doctor>> {
        doctor::update_doctor(&self.pool, doctor).await
    }

    async fn replace_slots(&self, id: DoctorId, times: Vec<String>) -> Result<Option<Doctor>> {
        doctor::replace_slots(&self.pool, id, &times).await
    }

    async fn append_slot(&self, id: DoctorId, slot: &str) -> Result<Option<Doctor>> {
        doctor::append_slot(&self.pool, id, slot).await
    }

    async fn withdraw_slot(&self, id: DoctorId, slot: &str) -> Result<Option<Doctor>> {
        doctor::withdraw_slot(&self.pool, id, slot).await
    }

    async fn delete(&self, id: DoctorId) -> Result<bool> {
        doctor::delete_doctor(&self.pool, id).await
    }
}

#[async_trait]
impl AppointmentRepository for PgRelationalStore {
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        appointment::get_appointment_by_id(&self.pool, id).await
    }

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>> {
        appointment::get_appointments_by_doctor_id(&self.pool, doctor_id).await
    }

    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        appointment::search_appointments(&self.pool, filter).await
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        appointment::update_appointment_status(&self.pool, id, status).await
    }

    async fn delete(&self, id: AppointmentId) -> Result<bool> {
        appointment::delete_appointment(&self.pool, id).await
    }

    async fn book(
        &self,
        doctor_id: DoctorId,
        slot: &str,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>> {
        appointment::book_appointment(&self.pool, doctor_id, slot, &appointment).await
    }
}

#[async_trait]
impl PrescriptionRepository for PgDocumentStore {
    fn assign_id(&self) -> PrescriptionId {
        PrescriptionId::generate()
    }

    async fn put(&self, prescription: &Prescription) -> Result<()> {
        prescription::put_prescription(&self.pool, prescription).await
    }

    async fn find_by_id(&self, id: &PrescriptionId) -> Result<Option<Prescription>> {
        prescription::get_prescription_by_id(&self.pool, id).await
    }

    async fn find_all(&self) -> Result<Vec<Prescription>> {
        prescription::get_all_prescriptions(&self.pool).await
    }

    async fn find_by_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Vec<Prescription>> {
        prescription::get_prescriptions_by_appointment_id(&self.pool, appointment_id).await
    }

    async fn update(&self, prescription: &Prescription) -> Result<Option<Prescription>> {
        prescription::update_prescription(&self.pool, prescription).await
    }

    async fn delete(&self, id: &PrescriptionId) -> Result<bool> {
        prescription::delete_prescription(&self.pool, id).await
    }
}
