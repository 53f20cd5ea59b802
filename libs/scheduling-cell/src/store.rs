// libs/scheduling-cell/src/store.rs
use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, SchedulingError};
use crate::services::conflict;

/// Arena of appointments keyed by id. Every mutation runs under the write
/// guard, so a conflict check and the write it protects form one
/// serializable unit: two concurrent bookings for the same window cannot
/// both pass the check.
pub struct AppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.read().await.get(&id).cloned()
    }

    pub async fn snapshot(&self) -> Vec<Appointment> {
        self.appointments.read().await.values().cloned().collect()
    }

    /// Conflict-checked insert: the new appointment is committed only if its
    /// window is free for the professional at commit time.
    pub async fn insert_booked(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, SchedulingError> {
        let mut map = self.appointments.write().await;

        if conflict::has_conflict(
            map.values(),
            appointment.professional_id,
            appointment.scheduled_start,
            appointment.scheduled_end,
            None,
        ) {
            return Err(SchedulingError::SlotConflict);
        }

        debug!("Inserting appointment {}", appointment.id);
        map.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    /// Load-mutate-commit under one guard. `mutate` receives the current row
    /// and returns its replacement; if the replacement still holds the slot
    /// and its window moved, the conflict check reruns against everyone else
    /// before the commit.
    pub async fn modify<F>(&self, id: Uuid, mutate: F) -> Result<Appointment, SchedulingError>
    where
        F: FnOnce(&Appointment) -> Result<Appointment, SchedulingError>,
    {
        let mut map = self.appointments.write().await;

        let current = map.get(&id).ok_or(SchedulingError::NotFound)?;
        let updated = mutate(current)?;

        let window_moved = updated.scheduled_start != current.scheduled_start
            || updated.scheduled_end != current.scheduled_end;

        if window_moved
            && updated.blocks_slot()
            && conflict::has_conflict(
                map.values(),
                updated.professional_id,
                updated.scheduled_start,
                updated.scheduled_end,
                Some(id),
            )
        {
            return Err(SchedulingError::SlotConflict);
        }

        debug!("Committing update to appointment {}", id);
        map.insert(id, updated.clone());
        Ok(updated)
    }

    /// Reschedule: mark the original and insert its replacement as one unit.
    /// The replacement window is checked with the original excluded, since
    /// the original stops holding the slot in the same commit.
    pub async fn reschedule<F>(
        &self,
        id: Uuid,
        split: F,
    ) -> Result<(Appointment, Appointment), SchedulingError>
    where
        F: FnOnce(&Appointment) -> Result<(Appointment, Appointment), SchedulingError>,
    {
        let mut map = self.appointments.write().await;

        let current = map.get(&id).ok_or(SchedulingError::NotFound)?;
        let (original, replacement) = split(current)?;

        if conflict::has_conflict(
            map.values(),
            replacement.professional_id,
            replacement.scheduled_start,
            replacement.scheduled_end,
            Some(id),
        ) {
            return Err(SchedulingError::SlotConflict);
        }

        debug!(
            "Rescheduling appointment {} into {}",
            original.id, replacement.id
        );
        map.insert(original.id, original.clone());
        map.insert(replacement.id, replacement.clone());
        Ok((original, replacement))
    }
}

impl Default for AppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}
