use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use fake::Fake;
use fake::faker::name::en::Name;
use pretty_assertions::assert_eq;
use rstest::rstest;
use smartclinic_core::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, Doctor, DoctorFilter,
    DoctorId, NewAppointment, NewDoctor, NewPrescription, Resolution,
};
use smartclinic_core::repositories::{AppointmentRepository, DoctorRepository};
use smartclinic_core::{ClinicService, ReferencePolicy, StoreKind};
use smartclinic_db::memory::{MemoryDocumentStore, MemoryRelationalStore};

struct TestContext {
    relational: Arc<MemoryRelationalStore>,
    documents: Arc<MemoryDocumentStore>,
    service: ClinicService,
}

impl TestContext {
    fn new() -> Self {
        let relational = Arc::new(MemoryRelationalStore::new());
        let documents = Arc::new(MemoryDocumentStore::new());
        let service = ClinicService::new(relational.clone(), relational.clone(), documents.clone());

        Self {
            relational,
            documents,
            service,
        }
    }
}

fn rao() -> NewDoctor {
    NewDoctor::new("Dr. Rao")
        .with_specialization("Cardiology")
        .with_available_times(["09:00", "10:00"])
}

#[test_log::test(tokio::test)]
async fn test_doctor_round_trip_preserves_fields_and_order() {
    let ctx = TestContext::new();

    let created = ctx.service.register_doctor(rao()).await.unwrap();
    let read = ctx.service.get_doctor(created.id).await.unwrap();

    assert_eq!(read, created);
    assert_eq!(read.name, "Dr. Rao");
    assert_eq!(read.specialization.as_deref(), Some("Cardiology"));
    assert_eq!(read.available_times(), ["09:00", "10:00"]);
}

#[tokio::test]
async fn test_store_assigns_distinct_ids() {
    let ctx = TestContext::new();

    let first = ctx.service.register_doctor(rao()).await.unwrap();
    let name: String = Name().fake();
    let second = ctx
        .service
        .register_doctor(NewDoctor::new(name))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn test_blank_name_never_reaches_the_store(#[case] name: &str) {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .register_doctor(NewDoctor::new(name))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(ctx.service.list_doctors().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_available_times_round_trips_duplicates_and_order() {
    let ctx = TestContext::new();
    let doctor = ctx.service.register_doctor(rao()).await.unwrap();
    let times: Vec<String> = vec!["14:00".into(), "08:00".into(), "14:00".into()];

    ctx.service
        .set_available_times(doctor.id, times.clone())
        .await
        .unwrap();
    let read = ctx.service.get_doctor(doctor.id).await.unwrap();

    assert_eq!(read.available_times(), times.as_slice());
}

#[tokio::test]
async fn test_add_and_withdraw_slots() {
    let ctx = TestContext::new();
    let doctor = ctx.service.register_doctor(rao()).await.unwrap();

    ctx.service
        .add_available_time(doctor.id, "09:00")
        .await
        .unwrap();
    let updated = ctx
        .service
        .withdraw_available_time(doctor.id, "09:00")
        .await
        .unwrap();

    assert_eq!(updated.available_times(), ["10:00", "09:00"]);
    assert!(
        ctx.service
            .withdraw_available_time(doctor.id, "18:00")
            .await
            .unwrap_err()
            .is_validation()
    );
}

/// Commits a booking of `slot` around the first doctor-table call it
/// forwards, standing in for a patient who books concurrently.
struct BookingFirst {
    inner: Arc<MemoryRelationalStore>,
    slot: &'static str,
    booked: AtomicBool,
}

impl BookingFirst {
    async fn interleave(&self, doctor_id: DoctorId) {
        if self.booked.swap(true, Ordering::SeqCst) {
            return;
        }
        let appointment = NewAppointment {
            doctor_id,
            patient_name: "Walk-in".to_string(),
            appointment_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        };
        self.inner
            .book(doctor_id, self.slot, appointment)
            .await
            .unwrap()
            .expect("slot should still be offered");
    }
}

#[async_trait]
impl DoctorRepository for BookingFirst {
    async fn create(&self, doctor: NewDoctor) -> eyre::Result<Doctor> {
        DoctorRepository::create(self.inner.as_ref(), doctor).await
    }

    async fn find_by_id(&self, id: DoctorId) -> eyre::Result<Option<Doctor>> {
        // The caller gets a copy that predates the booking.
        let doctor = DoctorRepository::find_by_id(self.inner.as_ref(), id).await?;
        self.interleave(id).await;
        Ok(doctor)
    }

    async fn find_all(&self) -> eyre::Result<Vec<Doctor>> {
        self.inner.find_all().await
    }

    async fn filter(&self, filter: &DoctorFilter) -> eyre::Result<Vec<Doctor>> {
        DoctorRepository::filter(self.inner.as_ref(), filter).await
    }

    async fn update(&self, doctor: &Doctor) -> eyre::Result<Option<Doctor>> {
        self.interleave(doctor.id).await;
        self.inner.update(doctor).await
    }

    async fn replace_slots(
        &self,
        id: DoctorId,
        times: Vec<String>,
    ) -> eyre::Result<Option<Doctor>> {
        self.interleave(id).await;
        self.inner.replace_slots(id, times).await
    }

    async fn append_slot(&self, id: DoctorId, slot: &str) -> eyre::Result<Option<Doctor>> {
        self.interleave(id).await;
        self.inner.append_slot(id, slot).await
    }

    async fn withdraw_slot(&self, id: DoctorId, slot: &str) -> eyre::Result<Option<Doctor>> {
        self.interleave(id).await;
        self.inner.withdraw_slot(id, slot).await
    }

    async fn delete(&self, id: DoctorId) -> eyre::Result<bool> {
        DoctorRepository::delete(self.inner.as_ref(), id).await
    }
}

#[rstest]
#[case("add")]
#[case("withdraw")]
#[tokio::test]
async fn test_slot_edits_never_reopen_a_concurrent_booking(#[case] edit: &str) {
    let relational = Arc::new(MemoryRelationalStore::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let doctor = DoctorRepository::create(relational.as_ref(), rao())
        .await
        .unwrap();
    let doctors = Arc::new(BookingFirst {
        inner: relational.clone(),
        slot: "09:00",
        booked: AtomicBool::new(false),
    });
    let service = ClinicService::new(doctors, relational.clone(), documents);

    let edited = match edit {
        "add" => service.add_available_time(doctor.id, "11:00").await,
        _ => service.withdraw_available_time(doctor.id, "10:00").await,
    }
    .unwrap();

    let expected: &[&str] = if edit == "add" { &["10:00", "11:00"] } else { &[] };
    assert_eq!(edited.available_times(), expected);
    assert_eq!(service.appointments_for_doctor(doctor.id).await.unwrap().len(), 1);
    assert!(!service.get_doctor(doctor.id).await.unwrap().offers("09:00"));
}

#[tokio::test]
async fn test_filter_doctors() {
    let ctx = TestContext::new();
    ctx.service.register_doctor(rao()).await.unwrap();
    ctx.service
        .register_doctor(
            NewDoctor::new("Dr. Okafor")
                .with_specialization("Dermatology")
                .with_available_times(["10:00"]),
        )
        .await
        .unwrap();

    let at_ten = ctx
        .service
        .filter_doctors(&DoctorFilter {
            time: Some("10:00".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let cardiology = ctx
        .service
        .filter_doctors(&DoctorFilter {
            specialization: Some("cardiology".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(at_ten.len(), 2);
    assert_eq!(cardiology.len(), 1);
    assert_eq!(cardiology[0].name, "Dr. Rao");
}

#[tokio::test]
async fn test_booking_takes_one_slot_entry() {
    let ctx = TestContext::new();
    let doctor = ctx
        .service
        .register_doctor(NewDoctor::new("Dr. Rao").with_available_times(["09:00", "10:00", "09:00"]))
        .await
        .unwrap();
    let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    let appointment = ctx
        .service
        .book_appointment(doctor.id, "09:00", "J. Doe", at)
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.doctor_id, doctor.id);
    assert_eq!(
        ctx.service.get_doctor(doctor.id).await.unwrap().available_times(),
        ["10:00", "09:00"]
    );
}

#[tokio::test]
async fn test_booking_unknown_doctor_is_not_found() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .book_appointment(DoctorId(404), "09:00", "J. Doe", Utc::now())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_appointments_for_doctor_are_time_ordered() {
    let ctx = TestContext::new();
    let doctor = ctx.service.register_doctor(rao()).await.unwrap();
    let morning = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    let late = ctx
        .service
        .book_appointment(doctor.id, "10:00", "A. Late", morning + Duration::hours(1))
        .await
        .unwrap();
    let early = ctx
        .service
        .book_appointment(doctor.id, "09:00", "B. Early", morning)
        .await
        .unwrap();
    ctx.service
        .update_appointment_status(early.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let listed = ctx.service.appointments_for_doctor(doctor.id).await.unwrap();

    assert_eq!(
        listed.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![early.id, late.id]
    );
    assert_eq!(listed[0].status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_filter_appointments_by_day_patient_and_status() {
    let ctx = TestContext::new();
    let doctor = ctx
        .service
        .register_doctor(NewDoctor::new("Dr. Rao").with_available_times(["09:00", "10:00", "09:00"]))
        .await
        .unwrap();
    let monday = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    let jane = ctx
        .service
        .book_appointment(doctor.id, "09:00", "Jane Doe", monday)
        .await
        .unwrap();
    let john = ctx
        .service
        .book_appointment(doctor.id, "10:00", "John Doe", monday + Duration::hours(1))
        .await
        .unwrap();
    let next_week = ctx
        .service
        .book_appointment(doctor.id, "09:00", "Jane Doe", monday + Duration::days(7))
        .await
        .unwrap();
    ctx.service
        .update_appointment_status(john.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let ids = |found: Vec<Appointment>| {
        found.into_iter().map(|a| a.id).collect::<Vec<_>>()
    };
    let on_monday = AppointmentFilter {
        date: Some(monday.date_naive()),
        ..Default::default()
    };
    let janes = AppointmentFilter {
        patient_name: Some("JANE".into()),
        ..Default::default()
    };
    let completed = AppointmentFilter {
        doctor_id: Some(doctor.id),
        status: Some(AppointmentStatus::Completed),
        ..Default::default()
    };

    assert_eq!(
        ids(ctx.service.filter_appointments(&on_monday).await.unwrap()),
        vec![jane.id, john.id]
    );
    assert_eq!(
        ids(ctx.service.filter_appointments(&janes).await.unwrap()),
        vec![jane.id, next_week.id]
    );
    assert_eq!(
        ids(ctx.service.filter_appointments(&completed).await.unwrap()),
        vec![john.id]
    );
}

#[tokio::test]
async fn test_prescription_without_appointment_round_trips() {
    let ctx = TestContext::new();

    let issued = ctx
        .service
        .issue_prescription(
            NewPrescription {
                patient_name: Some("J. Doe".into()),
                medication: Some("Ibuprofen".into()),
                appointment_id: None,
            },
            ReferencePolicy::RequireAppointment,
        )
        .await
        .unwrap();
    let read = ctx.service.get_prescription(&issued.id).await.unwrap();

    assert_eq!(read, issued);
    assert_eq!(read.appointment_id, None);
}

#[tokio::test]
async fn test_dangling_reference_is_written_and_resolves_as_missing() {
    let ctx = TestContext::new();

    let issued = ctx
        .service
        .issue_prescription(
            NewPrescription::new("J. Doe", "Amoxicillin", Some(AppointmentId(42))),
            ReferencePolicy::Tolerate,
        )
        .await
        .unwrap();
    let resolved = ctx
        .service
        .get_prescription_with_appointment(&issued.id)
        .await
        .unwrap();

    assert_eq!(resolved.prescription, issued);
    assert!(matches!(
        resolved.appointment,
        Some(Resolution::Missing(reference)) if reference.id() == AppointmentId(42)
    ));
}

#[tokio::test]
async fn test_removing_doctor_does_not_cascade() {
    let ctx = TestContext::new();
    let doctor = ctx.service.register_doctor(rao()).await.unwrap();
    let appointment = ctx
        .service
        .book_appointment(doctor.id, "09:00", "J. Doe", Utc::now())
        .await
        .unwrap();
    let prescription = ctx
        .service
        .issue_prescription(
            NewPrescription::new("J. Doe", "Amoxicillin", Some(appointment.id)),
            ReferencePolicy::RequireAppointment,
        )
        .await
        .unwrap();

    ctx.service.remove_doctor(doctor.id).await.unwrap();

    assert!(ctx.service.get_doctor(doctor.id).await.unwrap_err().is_not_found());
    assert_eq!(
        ctx.service.get_appointment(appointment.id).await.unwrap(),
        appointment
    );
    let resolved = ctx
        .service
        .get_prescription_with_appointment(&prescription.id)
        .await
        .unwrap();
    assert!(!resolved.is_dangling());
}

#[tokio::test]
async fn test_deleting_appointment_leaves_prescription_dangling() {
    let ctx = TestContext::new();
    let doctor = ctx.service.register_doctor(rao()).await.unwrap();
    let appointment = ctx
        .service
        .book_appointment(doctor.id, "10:00", "J. Doe", Utc::now())
        .await
        .unwrap();
    let prescription = ctx
        .service
        .issue_prescription(
            NewPrescription::new("J. Doe", "Amoxicillin", Some(appointment.id)),
            ReferencePolicy::RequireAppointment,
        )
        .await
        .unwrap();

    ctx.service.delete_appointment(appointment.id).await.unwrap();

    assert_eq!(
        ctx.service
            .prescriptions_for_appointment(appointment.id)
            .await
            .unwrap(),
        vec![prescription.clone()]
    );
    assert_eq!(
        ctx.service.find_dangling_prescriptions().await.unwrap(),
        vec![prescription]
    );
}

#[tokio::test]
async fn test_require_appointment_refuses_unknown_reference() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .issue_prescription(
            NewPrescription::new("J. Doe", "Amoxicillin", Some(AppointmentId(42))),
            ReferencePolicy::RequireAppointment,
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(ctx.documents.is_empty().await);
}

#[tokio::test]
async fn test_outages_name_the_failing_store() {
    let ctx = TestContext::new();
    let doctor = ctx.service.register_doctor(rao()).await.unwrap();
    let appointment = ctx
        .service
        .book_appointment(doctor.id, "09:00", "J. Doe", Utc::now())
        .await
        .unwrap();

    ctx.documents.set_available(false);
    let pending = ctx.service.prepare_prescription(NewPrescription::new(
        "J. Doe",
        "Amoxicillin",
        Some(appointment.id),
    ));
    let err = ctx
        .service
        .commit_prescription(&pending, ReferencePolicy::RequireAppointment)
        .await
        .unwrap_err();
    assert_eq!(err.store(), Some(StoreKind::Document));

    // Retrying the same prepared document once the store is back writes it once.
    ctx.documents.set_available(true);
    ctx.service
        .commit_prescription(&pending, ReferencePolicy::RequireAppointment)
        .await
        .unwrap();
    ctx.service
        .commit_prescription(&pending, ReferencePolicy::RequireAppointment)
        .await
        .unwrap();
    assert_eq!(ctx.documents.len().await, 1);

    ctx.relational.set_available(false);
    let err = ctx.service.get_doctor(doctor.id).await.unwrap_err();
    assert_eq!(err.store(), Some(StoreKind::Relational));
    assert_eq!(
        ctx.service.get_prescription(&pending.id).await.unwrap(),
        pending
    );
}

#[tokio::test]
async fn test_corrective_edit_and_delete() {
    let ctx = TestContext::new();
    let mut prescription = ctx
        .service
        .issue_prescription(
            NewPrescription::new("J. Doe", "Amoxicilin", None),
            ReferencePolicy::Tolerate,
        )
        .await
        .unwrap();

    prescription.medication = Some("Amoxicillin".into());
    let corrected = ctx
        .service
        .correct_prescription(&prescription, ReferencePolicy::Tolerate)
        .await
        .unwrap();
    assert_eq!(corrected.medication.as_deref(), Some("Amoxicillin"));

    ctx.service.delete_prescription(&prescription.id).await.unwrap();
    assert!(
        ctx.service
            .get_prescription(&prescription.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        ctx.service
            .correct_prescription(&prescription, ReferencePolicy::Tolerate)
            .await
            .unwrap_err()
            .is_not_found()
    );
}
