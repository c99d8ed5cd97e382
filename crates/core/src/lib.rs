//! # Smart Clinic core
//!
//! Domain model for practitioners, appointments and prescriptions, plus the
//! storage seams and the service that keeps the relational and document
//! stores consistent with each other.

pub mod errors;
pub mod mock;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

pub use errors::{ClinicError, ClinicResult, StoreKind};
pub use services::{ClinicService, ReferencePolicy};
