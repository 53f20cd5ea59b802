// libs/scheduling-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Appointment;

/// Two half-open windows `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. Touching endpoints do not conflict.
pub fn windows_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

/// First-hit conflict probe over the given appointments. Only rows that hold
/// the professional's slot (active flag + booking-active status) count;
/// `exclude` skips the row being updated or rescheduled.
pub fn has_conflict<'a, I>(
    appointments: I,
    professional_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> bool
where
    I: IntoIterator<Item = &'a Appointment>,
{
    debug!(
        "Checking conflicts for professional {} from {} to {}",
        professional_id, start, end
    );

    let found = appointments.into_iter().any(|appointment| {
        appointment.professional_id == professional_id
            && Some(appointment.id) != exclude
            && appointment.blocks_slot()
            && windows_overlap(start, end, appointment.scheduled_start, appointment.scheduled_end)
    });

    if found {
        warn!(
            "Conflict detected for professional {} at {}",
            professional_id, start
        );
    }

    found
}

/// All conflicting rows, for the conflict-probe endpoint.
pub fn find_conflicts<'a, I>(
    appointments: I,
    professional_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Vec<Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let mut conflicts: Vec<Appointment> = appointments
        .into_iter()
        .filter(|appointment| {
            appointment.professional_id == professional_id
                && Some(appointment.id) != exclude
                && appointment.blocks_slot()
                && windows_overlap(
                    start,
                    end,
                    appointment.scheduled_start,
                    appointment.scheduled_end,
                )
        })
        .cloned()
        .collect();

    conflicts.sort_by_key(|a| a.scheduled_start);
    conflicts
}
