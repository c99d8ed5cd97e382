pub mod appointment;
pub mod doctor;
pub mod ids;
pub mod prescription;
pub mod reference;

pub use appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};
pub use doctor::{Doctor, DoctorFilter, NewDoctor};
pub use ids::{AppointmentId, DoctorId, PrescriptionId};
pub use prescription::{NewPrescription, Prescription};
pub use reference::{AppointmentRef, Resolution, ResolvedPrescription};
