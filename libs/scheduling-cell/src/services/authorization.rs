// libs/scheduling-cell/src/services/authorization.rs
use uuid::Uuid;

use shared_models::auth::Principal;

use crate::models::{Appointment, AppointmentAction};

/// Row-level policy, first match wins:
/// 1. admin may do anything;
/// 2. the owning professional may read their rows;
/// 3. the linked patient may read their rows;
/// 4. the owning professional may mutate their rows;
/// 5. everything else is denied.
pub fn can_perform(
    principal: &Principal,
    action: AppointmentAction,
    appointment: &Appointment,
) -> bool {
    if principal.is_admin() {
        return true;
    }

    let owns_row = principal.owned_professional_id() == Some(appointment.professional_id);

    if action.is_read_only() {
        if owns_row {
            return true;
        }
        return is_linked_patient(principal, appointment);
    }

    owns_row
}

/// Whether the row shows up at all for this principal. Drives both single-row
/// reads and the implicit list filter: invisible rows are absent, not errors.
pub fn visible_to(principal: &Principal, appointment: &Appointment) -> bool {
    can_perform(principal, AppointmentAction::Get, appointment)
}

/// Create is gated on the payload rather than an existing row: admins may
/// book for anyone, a professional only for themselves, and a patient may
/// book their own consultation.
pub fn can_create(principal: &Principal, professional_id: Uuid) -> bool {
    if principal.is_admin() {
        return true;
    }
    match principal.owned_professional_id() {
        Some(owned) => owned == professional_id,
        None => principal.linked_patient_id().is_some(),
    }
}

fn is_linked_patient(principal: &Principal, appointment: &Appointment) -> bool {
    match (principal.linked_patient_id(), appointment.patient_account_id) {
        (Some(linked), Some(account)) => linked == account,
        _ => false,
    }
}
