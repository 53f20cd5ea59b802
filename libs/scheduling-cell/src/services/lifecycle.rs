// libs/scheduling-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentStatus, SchedulingError, TransitionAction};

/// The appointment state machine. Initial state is `scheduled`; `completed`
/// and `cancelled` are terminal.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Validate that `action` may fire from `current`.
    pub fn guard(
        &self,
        current: AppointmentStatus,
        action: TransitionAction,
    ) -> Result<(), SchedulingError> {
        debug!("Validating transition {} from {}", action, current);

        if !self.allowed_actions(current).contains(&action) {
            warn!("Invalid transition attempted: {} from {}", action, current);
            return Err(SchedulingError::InvalidTransition { current, action });
        }

        Ok(())
    }

    /// All actions that may fire from a given status.
    pub fn allowed_actions(&self, current: AppointmentStatus) -> Vec<TransitionAction> {
        match current {
            AppointmentStatus::Scheduled => vec![
                TransitionAction::Confirm,
                TransitionAction::Start,
                TransitionAction::Cancel,
                TransitionAction::NoShow,
                TransitionAction::Reschedule,
            ],
            AppointmentStatus::Confirmed => vec![
                TransitionAction::Start,
                TransitionAction::Cancel,
                TransitionAction::NoShow,
                TransitionAction::Reschedule,
            ],
            AppointmentStatus::InProgress => vec![
                TransitionAction::Finish,
                TransitionAction::Cancel,
                TransitionAction::Reschedule,
            ],
            AppointmentStatus::NoShow | AppointmentStatus::Rescheduled => vec![
                TransitionAction::Cancel,
                TransitionAction::Reschedule,
            ],
            // Terminal states
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Target status of a non-reschedule transition.
    pub fn target(&self, action: TransitionAction) -> AppointmentStatus {
        match action {
            TransitionAction::Confirm => AppointmentStatus::Confirmed,
            TransitionAction::Start => AppointmentStatus::InProgress,
            TransitionAction::Finish => AppointmentStatus::Completed,
            TransitionAction::Cancel => AppointmentStatus::Cancelled,
            TransitionAction::NoShow => AppointmentStatus::NoShow,
            TransitionAction::Reschedule => AppointmentStatus::Rescheduled,
        }
    }

    pub fn can_cancel(&self, current: AppointmentStatus) -> bool {
        !current.is_terminal()
    }

    pub fn can_reschedule(&self, current: AppointmentStatus) -> bool {
        !current.is_terminal()
    }
}

impl Default for AppointmentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
