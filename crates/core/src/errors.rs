use std::fmt;

use thiserror::Error;

/// The two independent storage engines a clinic operation can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Doctors and appointments.
    Relational,
    /// Prescriptions.
    Document,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Relational => write!(f, "relational"),
            StoreKind::Document => write!(f, "document"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Relational store error: {0}")]
    RelationalStore(#[source] eyre::Report),

    #[error("Document store error: {0}")]
    DocumentStore(#[source] eyre::Report),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ClinicError {
    /// Which store failed, if the error came from one.
    ///
    /// A caller coordinating both stores uses this to learn which half of a
    /// cross-store operation did not complete.
    pub fn store(&self) -> Option<StoreKind> {
        match self {
            ClinicError::RelationalStore(_) => Some(StoreKind::Relational),
            ClinicError::DocumentStore(_) => Some(StoreKind::Document),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClinicError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClinicError::Validation(_))
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;
