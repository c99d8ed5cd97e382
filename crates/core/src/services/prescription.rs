use std::collections::HashMap;

use tracing::{debug, warn};

use super::{ClinicService, ReferencePolicy, document, relational};
use crate::errors::{ClinicError, ClinicResult};
use crate::models::{
    Appointment, AppointmentId, NewPrescription, Prescription, PrescriptionId, Resolution,
    ResolvedPrescription,
};
use crate::validation::Validate;

impl ClinicService {
    /// Builds a prescription with a freshly minted id. Nothing is written.
    ///
    /// Holding on to the returned value lets a caller retry
    /// [`commit_prescription`](Self::commit_prescription) without creating
    /// a second document.
    pub fn prepare_prescription(&self, prescription: NewPrescription) -> Prescription {
        Prescription::from_new(self.prescriptions.assign_id(), prescription)
    }

    /// Writes a prepared prescription.
    ///
    /// With `RequireAppointment` the relational store is consulted first and
    /// the document is only written if the appointment exists. The document
    /// write is an upsert, so calling this again after a lost response is safe.
    pub async fn commit_prescription(
        &self,
        prescription: &Prescription,
        policy: ReferencePolicy,
    ) -> ClinicResult<()> {
        prescription.validate()?;
        self.check_reference(prescription.appointment_id, policy)
            .await?;

        self.prescriptions
            .put(prescription)
            .await
            .map_err(document)?;

        debug!(
            "Stored prescription: id={}, appointment_id={:?}",
            prescription.id, prescription.appointment_id
        );
        Ok(())
    }

    pub async fn issue_prescription(
        &self,
        prescription: NewPrescription,
        policy: ReferencePolicy,
    ) -> ClinicResult<Prescription> {
        let prescription = self.prepare_prescription(prescription);
        self.commit_prescription(&prescription, policy).await?;
        Ok(prescription)
    }

    pub async fn get_prescription(&self, id: &PrescriptionId) -> ClinicResult<Prescription> {
        self.prescriptions
            .find_by_id(id)
            .await
            .map_err(document)?
            .ok_or_else(|| ClinicError::NotFound(format!("Prescription with ID {} not found", id)))
    }

    pub async fn list_prescriptions(&self) -> ClinicResult<Vec<Prescription>> {
        self.prescriptions.find_all().await.map_err(document)
    }

    pub async fn prescriptions_for_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> ClinicResult<Vec<Prescription>> {
        self.prescriptions
            .find_by_appointment(appointment_id)
            .await
            .map_err(document)
    }

    /// Corrective edit of an existing prescription.
    pub async fn correct_prescription(
        &self,
        prescription: &Prescription,
        policy: ReferencePolicy,
    ) -> ClinicResult<Prescription> {
        prescription.validate()?;
        self.check_reference(prescription.appointment_id, policy)
            .await?;

        self.prescriptions
            .update(prescription)
            .await
            .map_err(document)?
            .ok_or_else(|| {
                ClinicError::NotFound(format!(
                    "Prescription with ID {} not found",
                    prescription.id
                ))
            })
    }

    pub async fn delete_prescription(&self, id: &PrescriptionId) -> ClinicResult<()> {
        let removed = self.prescriptions.delete(id).await.map_err(document)?;
        if !removed {
            return Err(ClinicError::NotFound(format!(
                "Prescription with ID {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Follows the prescription's appointment reference.
    ///
    /// `Ok(None)` means the prescription has no reference. A deleted
    /// appointment yields `Resolution::Missing`; only an unreachable
    /// relational store is an error.
    pub async fn resolve_appointment(
        &self,
        prescription: &Prescription,
    ) -> ClinicResult<Option<Resolution<Appointment>>> {
        let Some(reference) = prescription.appointment_ref() else {
            return Ok(None);
        };

        let found = self
            .appointments
            .find_by_id(reference.id())
            .await
            .map_err(relational)?;

        Ok(Some(match found {
            Some(appointment) => Resolution::Found(appointment),
            None => {
                warn!(
                    "Prescription {} references missing appointment {}",
                    prescription.id,
                    reference.id()
                );
                Resolution::Missing(reference)
            }
        }))
    }

    pub async fn get_prescription_with_appointment(
        &self,
        id: &PrescriptionId,
    ) -> ClinicResult<ResolvedPrescription> {
        let prescription = self.get_prescription(id).await?;
        let appointment = self.resolve_appointment(&prescription).await?;

        Ok(ResolvedPrescription {
            prescription,
            appointment,
        })
    }

    /// Every prescription whose appointment reference no longer resolves.
    pub async fn find_dangling_prescriptions(&self) -> ClinicResult<Vec<Prescription>> {
        let prescriptions = self.list_prescriptions().await?;
        let mut exists: HashMap<AppointmentId, bool> = HashMap::new();
        let mut dangling = Vec::new();

        for prescription in prescriptions {
            let Some(appointment_id) = prescription.appointment_id else {
                continue;
            };

            let present = match exists.get(&appointment_id) {
                Some(present) => *present,
                None => {
                    let present = self
                        .appointments
                        .find_by_id(appointment_id)
                        .await
                        .map_err(relational)?
                        .is_some();
                    exists.insert(appointment_id, present);
                    present
                }
            };

            if !present {
                dangling.push(prescription);
            }
        }

        debug!(
            "Reference scan finished: {} dangling, {} appointments checked",
            dangling.len(),
            exists.len()
        );
        Ok(dangling)
    }

    async fn check_reference(
        &self,
        appointment_id: Option<AppointmentId>,
        policy: ReferencePolicy,
    ) -> ClinicResult<()> {
        let (ReferencePolicy::RequireAppointment, Some(appointment_id)) = (policy, appointment_id)
        else {
            return Ok(());
        };

        let exists = self
            .appointments
            .find_by_id(appointment_id)
            .await
            .map_err(relational)?
            .is_some();

        if !exists {
            warn!(
                "Refusing prescription for missing appointment {}",
                appointment_id
            );
            return Err(ClinicError::NotFound(format!(
                "Appointment with ID {} not found",
                appointment_id
            )));
        }
        Ok(())
    }
}
