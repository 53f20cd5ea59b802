// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODEL
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub duration_minutes: i32,
    pub scheduled_end: DateTime<Utc>,
    pub consultation_type: ConsultationType,
    pub status: AppointmentStatus,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    /// Linked patient account, when the booking was made from one. The
    /// authorization gate matches on this id, never on the contact snapshot.
    pub patient_account_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub paid: bool,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Appointment this one superseded via reschedule. A lookup key into the
    /// store, never an owning reference.
    pub origin_appointment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

impl Appointment {
    pub fn derived_end(start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
        start + Duration::minutes(duration_minutes as i64)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this row counts toward the no-overlap invariant.
    pub fn blocks_slot(&self) -> bool {
        self.active && self.status.is_booking_active()
    }

    /// View rendered for the linked patient: internal notes stay server-side.
    pub fn redacted_for_patient(mut self) -> Appointment {
        self.internal_notes = None;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    /// Statuses that hold the professional's time slot.
    pub fn is_booking_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled
                | AppointmentStatus::Confirmed
                | AppointmentStatus::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn parse(value: &str) -> Option<AppointmentStatus> {
        match value {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "in_progress" => Some(AppointmentStatus::InProgress),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "no_show" => Some(AppointmentStatus::NoShow),
            "rescheduled" => Some(AppointmentStatus::Rescheduled),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    FirstVisit,
    FollowUp,
    InPerson,
    Telehealth,
    Urgent,
}

impl Default for ConsultationType {
    fn default() -> Self {
        ConsultationType::FirstVisit
    }
}

impl fmt::Display for ConsultationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationType::FirstVisit => write!(f, "first_visit"),
            ConsultationType::FollowUp => write!(f, "follow_up"),
            ConsultationType::InPerson => write!(f, "in_person"),
            ConsultationType::Telehealth => write!(f, "telehealth"),
            ConsultationType::Urgent => write!(f, "urgent"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
    Pix,
    Insurance,
    BankTransfer,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Professional,
    System,
}

// ==============================================================================
// TRANSITIONS AND ACTIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Confirm,
    Start,
    Finish,
    Cancel,
    NoShow,
    Reschedule,
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionAction::Confirm => write!(f, "confirm"),
            TransitionAction::Start => write!(f, "start"),
            TransitionAction::Finish => write!(f, "finish"),
            TransitionAction::Cancel => write!(f, "cancel"),
            TransitionAction::NoShow => write!(f, "no_show"),
            TransitionAction::Reschedule => write!(f, "reschedule"),
        }
    }
}

/// Everything a principal can do to an existing appointment, as seen by the
/// authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    List,
    Get,
    Update,
    Delete,
    Transition(TransitionAction),
}

impl AppointmentAction {
    pub fn is_read_only(&self) -> bool {
        matches!(self, AppointmentAction::List | AppointmentAction::Get)
    }
}

/// Transition request payloads, one variant per lifecycle action.
#[derive(Debug, Clone)]
pub enum TransitionRequest {
    Confirm,
    Start,
    Finish,
    NoShow,
    Cancel {
        reason: String,
        cancelled_by: Option<CancelledBy>,
    },
    Reschedule {
        new_scheduled_start: DateTime<Utc>,
        reason: Option<String>,
    },
}

impl TransitionRequest {
    pub fn action(&self) -> TransitionAction {
        match self {
            TransitionRequest::Confirm => TransitionAction::Confirm,
            TransitionRequest::Start => TransitionAction::Start,
            TransitionRequest::Finish => TransitionAction::Finish,
            TransitionRequest::NoShow => TransitionAction::NoShow,
            TransitionRequest::Cancel { .. } => TransitionAction::Cancel,
            TransitionRequest::Reschedule { .. } => TransitionAction::Reschedule,
        }
    }
}

/// Result of a transition: reschedule is the one action producing a second
/// record.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Updated(Appointment),
    Rescheduled {
        original: Appointment,
        replacement: Appointment,
    },
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub professional_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub consultation_type: Option<ConsultationType>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub patient_account_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub paid: Option<bool>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub consultation_type: Option<ConsultationType>,
}

impl UpdateAppointmentRequest {
    pub fn changes_window(&self) -> bool {
        self.scheduled_start.is_some()
            || self.duration_minutes.is_some()
            || self.scheduled_end.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
    pub cancelled_by: Option<CancelledBy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_scheduled_start: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Future,
    Past,
    Today,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub professional_id: Option<Uuid>,
    /// Single status or comma-separated list.
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub period: Option<Period>,
    pub consultation_type: Option<ConsultationType>,
    pub paid: Option<bool>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictCheckQuery {
    pub professional_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub today: usize,
    pub current_month: usize,
    pub by_status: std::collections::BTreeMap<String, usize>,
    pub by_type: std::collections::BTreeMap<String, usize>,
    /// Paid revenue over the current month.
    pub month_revenue: Decimal,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("appointment slot conflicts with an existing booking")]
    SlotConflict,

    #[error("cannot {action} an appointment in status {current}")]
    InvalidTransition {
        current: AppointmentStatus,
        action: TransitionAction,
    },

    #[error("appointment not found")]
    NotFound,

    #[error("not authorized to perform this action")]
    Forbidden,

    #[error("appointment in status {0} cannot be edited")]
    NotEditable(AppointmentStatus),

    #[error("appointment in status {0} cannot be deleted")]
    NotDeletable(AppointmentStatus),

    #[error("directory service error: {0}")]
    Directory(String),
}

impl SchedulingError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        SchedulingError::Validation(vec![FieldError::new(field, message)])
    }
}
