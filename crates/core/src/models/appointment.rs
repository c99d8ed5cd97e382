use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::doctor::non_blank;
use super::ids::{AppointmentId, DoctorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// An appointment row in the relational store.
///
/// `doctor_id` is a plain value. Removing the doctor leaves the row alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_name: String,
    pub appointment_time: DateTime<Utc>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub doctor_id: DoctorId,
    pub patient_name: String,
    pub appointment_time: DateTime<Utc>,
}

impl Appointment {
    pub fn from_new(id: AppointmentId, new: NewAppointment) -> Self {
        Self {
            id,
            doctor_id: new.doctor_id,
            patient_name: new.patient_name,
            appointment_time: new.appointment_time,
            status: AppointmentStatus::Scheduled,
        }
    }
}

/// Search criteria for appointments. Unset criteria match every appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub doctor_id: Option<DoctorId>,
    /// Calendar day of `appointment_time`, in UTC.
    pub date: Option<NaiveDate>,
    /// Case-insensitive substring of the patient name.
    pub patient_name: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn patient_name_criterion(&self) -> Option<&str> {
        non_blank(&self.patient_name)
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        let doctor_ok = self.doctor_id.is_none_or(|id| appointment.doctor_id == id);
        let date_ok = self
            .date
            .is_none_or(|date| appointment.appointment_time.date_naive() == date);
        let patient_ok = self.patient_name_criterion().is_none_or(|name| {
            appointment
                .patient_name
                .to_lowercase()
                .contains(&name.to_lowercase())
        });
        let status_ok = self.status.is_none_or(|status| appointment.status == status);

        doctor_ok && date_ok && patient_ok && status_ok
    }
}
