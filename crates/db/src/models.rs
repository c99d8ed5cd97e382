use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use smartclinic_core::models::{
    Appointment, AppointmentId, AppointmentStatus, Doctor, DoctorId, Prescription, PrescriptionId,
};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctor {
    pub id: i64,
    pub name: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctorSlot {
    pub doctor_id: i64,
    pub position: i32,
    pub slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_name: String,
    pub appointment_time: DateTime<Utc>,
    pub status: String,
}

/// Body of a document in the `prescriptions` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPrescription {
    pub id: String,
    pub document: Json<PrescriptionDocument>,
}

impl DbDoctor {
    /// Joins the row with its slots, which must already be in position order.
    pub fn into_doctor(self, available_times: Vec<String>) -> Doctor {
        Doctor {
            id: DoctorId(self.id),
            name: self.name,
            specialization: self.specialization,
            available_times,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let status = row
            .status
            .parse::<AppointmentStatus>()
            .map_err(|e| eyre!("Appointment {}: {}", row.id, e))?;

        Ok(Appointment {
            id: AppointmentId(row.id),
            doctor_id: DoctorId(row.doctor_id),
            patient_name: row.patient_name,
            appointment_time: row.appointment_time,
            status,
        })
    }
}

impl From<&Prescription> for PrescriptionDocument {
    fn from(prescription: &Prescription) -> Self {
        Self {
            patient_name: prescription.patient_name.clone(),
            medication: prescription.medication.clone(),
            appointment_id: prescription.appointment_id.map(|id| id.0),
        }
    }
}

impl From<DbPrescription> for Prescription {
    fn from(row: DbPrescription) -> Self {
        let Json(document) = row.document;
        Prescription {
            id: PrescriptionId::from(row.id),
            patient_name: document.patient_name,
            medication: document.medication,
            appointment_id: document.appointment_id.map(AppointmentId),
        }
    }
}
