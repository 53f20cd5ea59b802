mod common;

use uuid::Uuid;

use common::{appointment_row, ts};
use scheduling_cell::models::{AppointmentAction, AppointmentStatus, TransitionAction};
use scheduling_cell::services::authorization::{can_create, can_perform, visible_to};
use shared_utils::test_utils::TestPrincipal;

fn sample_row(professional_id: Uuid, patient_account_id: Option<Uuid>) -> scheduling_cell::models::Appointment {
    appointment_row(
        professional_id,
        patient_account_id,
        ts("2030-01-10T14:00:00Z"),
        60,
        AppointmentStatus::Scheduled,
    )
}

#[test]
fn admin_can_do_anything() {
    let admin = TestPrincipal::admin("admin@example.com").to_principal();
    let row = sample_row(Uuid::new_v4(), Some(Uuid::new_v4()));

    for action in [
        AppointmentAction::List,
        AppointmentAction::Get,
        AppointmentAction::Update,
        AppointmentAction::Delete,
        AppointmentAction::Transition(TransitionAction::Cancel),
    ] {
        assert!(can_perform(&admin, action, &row));
    }
    assert!(can_create(&admin, row.professional_id));
}

#[test]
fn owning_professional_reads_and_mutates_only_their_rows() {
    let professional_id = Uuid::new_v4();
    let principal =
        TestPrincipal::professional("pro@example.com", professional_id).to_principal();

    let own = sample_row(professional_id, None);
    let foreign = sample_row(Uuid::new_v4(), None);

    assert!(can_perform(&principal, AppointmentAction::Get, &own));
    assert!(can_perform(&principal, AppointmentAction::Update, &own));
    assert!(can_perform(
        &principal,
        AppointmentAction::Transition(TransitionAction::Finish),
        &own
    ));

    assert!(!can_perform(&principal, AppointmentAction::Get, &foreign));
    assert!(!can_perform(&principal, AppointmentAction::Update, &foreign));
    assert!(!visible_to(&principal, &foreign));

    assert!(can_create(&principal, professional_id));
    assert!(!can_create(&principal, foreign.professional_id));
}

#[test]
fn linked_patient_reads_but_never_mutates() {
    let patient_id = Uuid::new_v4();
    let principal = TestPrincipal::patient("ana@example.com", patient_id).to_principal();

    let own = sample_row(Uuid::new_v4(), Some(patient_id));
    let foreign = sample_row(Uuid::new_v4(), Some(Uuid::new_v4()));

    assert!(can_perform(&principal, AppointmentAction::Get, &own));
    assert!(visible_to(&principal, &own));

    // Mutations are denied even on the patient's own row
    assert!(!can_perform(&principal, AppointmentAction::Update, &own));
    assert!(!can_perform(
        &principal,
        AppointmentAction::Transition(TransitionAction::Cancel),
        &own
    ));
    assert!(!can_perform(&principal, AppointmentAction::Delete, &own));

    assert!(!visible_to(&principal, &foreign));

    // Patients may book their own consultation
    assert!(can_create(&principal, Uuid::new_v4()));
}

#[test]
fn unlinked_rows_are_invisible_to_patients() {
    let principal = TestPrincipal::patient("ana@example.com", Uuid::new_v4()).to_principal();

    // Identity matching happens on the linked account, never on the snapshot
    let row = sample_row(Uuid::new_v4(), None);
    assert!(!visible_to(&principal, &row));
}
