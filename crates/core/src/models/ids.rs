//! Store-assigned surrogate identities.
//!
//! An identity only exists once a store has assigned it: pre-persistence
//! shapes (`NewDoctor`, `NewPrescription`, ...) have no id field at all, and
//! persisted shapes always carry one of these newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity generated by the relational store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(pub i64);

/// Identity of an appointment row in the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

/// Opaque identity minted by the document store.
///
/// Callers must treat the contents as an uninterpreted string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrescriptionId(String);

impl PrescriptionId {
    /// Length of a freshly minted id, matching the ObjectId hex form.
    pub const LEN: usize = 24;

    /// Mints a new random id. Only document store implementations call this.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..Self::LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PrescriptionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PrescriptionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PrescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
