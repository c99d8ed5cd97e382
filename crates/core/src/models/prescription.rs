use serde::{Deserialize, Serialize};

use super::ids::{AppointmentId, PrescriptionId};
use super::reference::AppointmentRef;

/// A prescription document.
///
/// Every field besides the id is optional; the document store accepts
/// partially populated records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: PrescriptionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
}

impl NewPrescription {
    pub fn new(
        patient_name: impl Into<String>,
        medication: impl Into<String>,
        appointment_id: Option<AppointmentId>,
    ) -> Self {
        Self {
            patient_name: Some(patient_name.into()),
            medication: Some(medication.into()),
            appointment_id,
        }
    }
}

impl Prescription {
    pub fn from_new(id: PrescriptionId, new: NewPrescription) -> Self {
        Self {
            id,
            patient_name: new.patient_name,
            medication: new.medication,
            appointment_id: new.appointment_id,
        }
    }

    /// The weak reference to the appointment, if one was recorded.
    pub fn appointment_ref(&self) -> Option<AppointmentRef> {
        self.appointment_id.map(AppointmentRef::new)
    }
}
