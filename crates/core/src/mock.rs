use async_trait::async_trait;
use mockall::mock;

use crate::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, Doctor, DoctorFilter,
    DoctorId, NewAppointment, NewDoctor, Prescription, PrescriptionId,
};
use crate::repositories::{AppointmentRepository, DoctorRepository, PrescriptionRepository};

// Mock repositories for testing
mock! {
    pub DoctorRepo {}

    #[async_trait]
    impl DoctorRepository for DoctorRepo {
        async fn create(&self, doctor: NewDoctor) -> eyre::Result<Doctor>;

        async fn find_by_id(&self, id: DoctorId) -> eyre::Result<Option<Doctor>>;

        async fn find_all(&self) -> eyre::Result<Vec<Doctor>>;

        async fn filter(&self, filter: &DoctorFilter) -> eyre::Result<Vec<Doctor>>;

        async fn update(&self, doctor: &Doctor) -> eyre::Result<Option<Doctor>>;

        async fn replace_slots(
            &self,
            id: DoctorId,
            times: Vec<String>,
        ) -> eyre::Result<Option<Doctor>>;

        async fn append_slot(&self, id: DoctorId, slot: &str) -> eyre::Result<Option<Doctor>>;

        async fn withdraw_slot(&self, id: DoctorId, slot: &str) -> eyre::Result<Option<Doctor>>;

        async fn delete(&self, id: DoctorId) -> eyre::Result<bool>;
    }
}

mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentRepository for AppointmentRepo {
        async fn find_by_id(&self, id: AppointmentId) -> eyre::Result<Option<Appointment>>;

        async fn find_by_doctor(&self, doctor_id: DoctorId) -> eyre::Result<Vec<Appointment>>;

        async fn search(&self, filter: &AppointmentFilter) -> eyre::Result<Vec<Appointment>>;

        async fn update_status(
            &self,
            id: AppointmentId,
            status: AppointmentStatus,
        ) -> eyre::Result<Option<Appointment>>;

        async fn delete(&self, id: AppointmentId) -> eyre::Result<bool>;

        async fn book(
            &self,
            doctor_id: DoctorId,
            slot: &str,
            appointment: NewAppointment,
        ) -> eyre::Result<Option<Appointment>>;
    }
}

mock! {
    pub PrescriptionRepo {}

    #[async_trait]
    impl PrescriptionRepository for PrescriptionRepo {
        fn assign_id(&self) -> PrescriptionId;

        async fn put(&self, prescription: &Prescription) -> eyre::Result<()>;

        async fn find_by_id(&self, id: &PrescriptionId) -> eyre::Result<Option<Prescription>>;

        async fn find_all(&self) -> eyre::Result<Vec<Prescription>>;

        async fn find_by_appointment(
            &self,
            appointment_id: AppointmentId,
        ) -> eyre::Result<Vec<Prescription>>;

        async fn update(&self, prescription: &Prescription) -> eyre::Result<Option<Prescription>>;

        async fn delete(&self, id: &PrescriptionId) -> eyre::Result<bool>;
    }
}
