//! Weak references across stores.
//!
//! A prescription points at an appointment by id only. Nothing guarantees
//! the target still exists, so resolving a reference yields a value that
//! may be `Missing` instead of failing.

use serde::{Deserialize, Serialize};

use super::appointment::Appointment;
use super::ids::AppointmentId;
use super::prescription::Prescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentRef(AppointmentId);

impl AppointmentRef {
    pub fn new(id: AppointmentId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> AppointmentId {
        self.0
    }
}

/// Outcome of following a weak reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum Resolution<T> {
    Found(T),
    Missing(AppointmentRef),
}

impl<T> Resolution<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Resolution::Missing(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Resolution::Found(value) => Some(value),
            Resolution::Missing(_) => None,
        }
    }
}

/// A prescription read together with its appointment context.
///
/// `appointment` is `None` when the prescription carries no reference at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrescription {
    pub prescription: Prescription,
    pub appointment: Option<Resolution<Appointment>>,
}

impl ResolvedPrescription {
    pub fn is_dangling(&self) -> bool {
        self.appointment
            .as_ref()
            .is_some_and(Resolution::is_missing)
    }
}
