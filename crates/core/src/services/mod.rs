//! # Clinic service
//!
//! `ClinicService` is the orchestrating layer above the repositories. It owns
//! everything that spans the relational and document stores:
//!
//! - **Write path**: an appointment must exist before a prescription pointing
//!   at it is written. There is no cross-store transaction, so the relational
//!   check and the document write are two sequential steps. The document write
//!   is an idempotent upsert and may be re-issued after a lost response.
//! - **Read path**: a prescription's appointment may have been deleted.
//!   Resolution reports that as `Resolution::Missing`, never as an error.
//! - **Delete path**: deleting a doctor or an appointment never touches
//!   prescriptions.
//!
//! Store failures are reported as `ClinicError::RelationalStore` or
//! `ClinicError::DocumentStore` so callers can tell which half failed.

mod appointment;
mod doctor;
mod prescription;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ClinicError;
use crate::repositories::{AppointmentRepository, DoctorRepository, PrescriptionRepository};

/// Whether a prescription write checks that its appointment exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Reject the write with `NotFound` if the referenced appointment is absent.
    RequireAppointment,
    /// Write without looking at the relational store.
    #[default]
    Tolerate,
}

#[derive(Clone)]
pub struct ClinicService {
    doctors: Arc<dyn DoctorRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    prescriptions: Arc<dyn PrescriptionRepository>,
}

impl ClinicService {
    pub fn new(
        doctors: Arc<dyn DoctorRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        prescriptions: Arc<dyn PrescriptionRepository>,
    ) -> Self {
        Self {
            doctors,
            appointments,
            prescriptions,
        }
    }
}

fn relational(err: eyre::Report) -> ClinicError {
    ClinicError::RelationalStore(err)
}

fn document(err: eyre::Report) -> ClinicError {
    ClinicError::DocumentStore(err)
}
