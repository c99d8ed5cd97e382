//! In-memory stores.
//!
//! `MemoryRelationalStore` and `MemoryDocumentStore` mirror the PostgreSQL
//! stores closely enough to run the service without a database: ids are
//! assigned on insert, slot order is kept, and booking is atomic. Either
//! store can be switched off to simulate an outage of that backend alone.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use eyre::{Result, eyre};
use smartclinic_core::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, Doctor, DoctorFilter,
    DoctorId, NewAppointment, NewDoctor, Prescription, PrescriptionId,
};
use smartclinic_core::repositories::{
    AppointmentRepository, DoctorRepository, PrescriptionRepository,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct RelationalTables {
    last_doctor_id: i64,
    doctors: BTreeMap<i64, Doctor>,
    last_appointment_id: i64,
    appointments: BTreeMap<i64, Appointment>,
}

pub struct MemoryRelationalStore {
    tables: RwLock<RelationalTables>,
    available: AtomicBool,
}

impl Default for MemoryRelationalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRelationalStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(RelationalTables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(eyre!("relational store unavailable"))
        }
    }
}

#[async_trait]
impl DoctorRepository for MemoryRelationalStore {
    async fn create(&self, doctor: NewDoctor) -> Result<Doctor> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        tables.last_doctor_id += 1;
        let id = tables.last_doctor_id;

        let doctor = Doctor::from_new(DoctorId(id), doctor);
        tables.doctors.insert(id, doctor.clone());
        Ok(doctor)
    }

    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.doctors.get(&id.0).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Doctor>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.doctors.values().cloned().collect())
    }

    async fn filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
        self.ensure_available()?;
        Ok(self
            .tables
            .read()
            .await
            .doctors
            .values()
            .filter(|doctor| filter.matches(doctor))
            .cloned()
            .collect())
    }

    async fn update(&self, doctor: &Doctor) -> Result<Option<Doctor>> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        match tables.doctors.get_mut(&doctor.id.0) {
            Some(stored) => {
                *stored = doctor.clone();
                Ok(Some(doctor.clone()))
            }
            None => Ok(None),
        }
    }

    async fn replace_slots(&self, id: DoctorId, times: Vec<String>) -> Result<Option<Doctor>> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.doctors.get_mut(&id.0).map(|doctor| {
            doctor.set_available_times(times);
            doctor.clone()
        }))
    }

    async fn append_slot(&self, id: DoctorId, slot: &str) -> Result<Option<Doctor>> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.doctors.get_mut(&id.0).map(|doctor| {
            doctor.add_available_time(slot);
            doctor.clone()
        }))
    }

    async fn withdraw_slot(&self, id: DoctorId, slot: &str) -> Result<Option<Doctor>> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let Some(doctor) = tables.doctors.get_mut(&id.0) else {
            return Ok(None);
        };
        if !doctor.withdraw_available_time(slot) {
            return Ok(None);
        }

        Ok(Some(doctor.clone()))
    }

    async fn delete(&self, id: DoctorId) -> Result<bool> {
        self.ensure_available()?;
        Ok(self.tables.write().await.doctors.remove(&id.0).is_some())
    }
}

#[async_trait]
impl AppointmentRepository for MemoryRelationalStore {
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.appointments.get(&id.0).cloned())
    }

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.appointment_time);
        Ok(appointments)
    }

    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.appointment_time, a.id));
        Ok(appointments)
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.appointments.get_mut(&id.0).map(|appointment| {
            appointment.status = status;
            appointment.clone()
        }))
    }

    async fn delete(&self, id: AppointmentId) -> Result<bool> {
        self.ensure_available()?;
        Ok(self.tables.write().await.appointments.remove(&id.0).is_some())
    }

    async fn book(
        &self,
        doctor_id: DoctorId,
        slot: &str,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>> {
        self.ensure_available()?;
        // One write guard covers both tables, like the relational transaction.
        let mut tables = self.tables.write().await;
        let Some(doctor) = tables.doctors.get_mut(&doctor_id.0) else {
            return Ok(None);
        };
        if !doctor.withdraw_available_time(slot) {
            return Ok(None);
        }

        Ok(Some(insert_appointment(&mut tables, appointment)))
    }
}

fn insert_appointment(tables: &mut RelationalTables, appointment: NewAppointment) -> Appointment {
    tables.last_appointment_id += 1;
    let id = tables.last_appointment_id;
    let appointment = Appointment::from_new(AppointmentId(id), appointment);
    tables.appointments.insert(id, appointment.clone());
    appointment
}

pub struct MemoryDocumentStore {
    // Kept in insertion order, as the collection returns them.
    documents: RwLock<Vec<Prescription>>,
    available: AtomicBool,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(eyre!("document store unavailable"))
        }
    }
}

#[async_trait]
impl PrescriptionRepository for MemoryDocumentStore {
    fn assign_id(&self) -> PrescriptionId {
        PrescriptionId::generate()
    }

    async fn put(&self, prescription: &Prescription) -> Result<()> {
        self.ensure_available()?;
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|p| p.id == prescription.id) {
            Some(stored) => *stored = prescription.clone(),
            None => documents.push(prescription.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PrescriptionId) -> Result<Option<Prescription>> {
        self.ensure_available()?;
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Prescription>> {
        self.ensure_available()?;
        Ok(self.documents.read().await.clone())
    }

    async fn find_by_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Vec<Prescription>> {
        self.ensure_available()?;
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|p| p.appointment_id == Some(appointment_id))
            .cloned()
            .collect())
    }

    async fn update(&self, prescription: &Prescription) -> Result<Option<Prescription>> {
        self.ensure_available()?;
        let mut documents = self.documents.write().await;
        Ok(documents
            .iter_mut()
            .find(|p| p.id == prescription.id)
            .map(|stored| {
                *stored = prescription.clone();
                stored.clone()
            }))
    }

    async fn delete(&self, id: &PrescriptionId) -> Result<bool> {
        self.ensure_available()?;
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|p| &p.id != id);
        Ok(documents.len() < before)
    }
}
