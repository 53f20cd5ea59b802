// libs/scheduling-cell/src/services/scheduling.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use directory_cell::{DirectoryError, ProfessionalDirectory};
use shared_models::auth::{Principal, Role};

use crate::models::{
    Appointment, AppointmentAction, AppointmentListQuery, AppointmentStats, AppointmentStatus,
    CancelledBy, ConflictCheckQuery, ConflictCheckResponse, CreateAppointmentRequest, Period,
    SchedulingError, TransitionAction, TransitionOutcome, TransitionRequest,
    UpdateAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycle;
use crate::services::{authorization, conflict, validation};
use crate::state::SchedulingState;
use crate::store::AppointmentStore;

/// The single entry point for appointment state. Orchestrates the
/// authorization gate, the state machine, and the conflict detector into
/// atomic operations against the store.
pub struct SchedulingService {
    store: Arc<AppointmentStore>,
    directory: Arc<dyn ProfessionalDirectory>,
    lifecycle: AppointmentLifecycle,
}

impl SchedulingService {
    pub fn new(state: &SchedulingState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            directory: Arc::clone(&state.directory),
            lifecycle: AppointmentLifecycle::new(),
        }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for professional {} at {}",
            request.professional_id, request.scheduled_start
        );

        if !authorization::can_create(principal, request.professional_id) {
            return Err(SchedulingError::Forbidden);
        }

        let now = Utc::now();
        let duration = request
            .duration_minutes
            .unwrap_or(validation::DEFAULT_DURATION_MINUTES);
        let scheduled_end = request
            .scheduled_end
            .unwrap_or_else(|| Appointment::derived_end(request.scheduled_start, duration));

        let mut errors = Vec::new();
        errors.extend(validation::check_duration(duration));
        errors.extend(validation::check_future_start(request.scheduled_start, now));
        errors.extend(validation::check_window(request.scheduled_start, scheduled_end));
        errors.extend(validation::check_patient_name(&request.patient_name));
        errors.extend(validation::check_patient_phone(&request.patient_phone));
        if let Some(email) = request.patient_email.as_deref() {
            errors.extend(validation::check_patient_email(email));
        }
        if let Some(amount) = request.amount {
            errors.extend(validation::check_amount(amount));
        }
        if let Some(reason) = request.reason.as_deref() {
            errors.extend(validation::check_text_len(
                "reason",
                reason,
                validation::MAX_REASON_LEN,
            ));
        }
        if let Some(notes) = request.notes.as_deref() {
            errors.extend(validation::check_text_len(
                "notes",
                notes,
                validation::MAX_NOTES_LEN,
            ));
        }
        if !errors.is_empty() {
            return Err(SchedulingError::Validation(errors));
        }

        let professional = match self.directory.fetch(request.professional_id).await {
            Ok(professional) => Some(professional),
            Err(DirectoryError::NotFound) => None,
            Err(DirectoryError::Upstream(msg)) => return Err(SchedulingError::Directory(msg)),
        };
        let professional = match professional {
            Some(professional) if professional.is_active => professional,
            _ => {
                return Err(SchedulingError::field(
                    "professional_id",
                    "professional is not active or does not exist",
                ))
            }
        };

        let amount = request.amount.or(professional.listed_price);
        let patient_account_id = principal
            .linked_patient_id()
            .or(request.patient_account_id);

        let appointment = Appointment {
            id: Uuid::new_v4(),
            professional_id: request.professional_id,
            scheduled_start: request.scheduled_start,
            duration_minutes: duration,
            scheduled_end,
            consultation_type: request.consultation_type.unwrap_or_default(),
            status: AppointmentStatus::Scheduled,
            patient_name: request.patient_name.trim().to_string(),
            patient_phone: request.patient_phone,
            patient_email: request.patient_email,
            patient_account_id,
            reason: request.reason,
            notes: request.notes,
            internal_notes: None,
            amount,
            payment_method: request.payment_method,
            paid: false,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            origin_appointment_id: None,
            created_at: now,
            updated_at: now,
            active: true,
        };

        let stored = self.store.insert_booked(appointment).await?;
        info!(
            "Appointment {} booked for professional {}",
            stored.id, stored.professional_id
        );
        Ok(self.render_for(principal, stored))
    }

    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.load_visible(principal, id).await?;
        Ok(self.render_for(principal, appointment))
    }

    /// Visibility-filtered listing, newest first. Rows the principal cannot
    /// read are silently absent.
    pub async fn list(
        &self,
        principal: &Principal,
        query: &AppointmentListQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let statuses = parse_status_filter(query.status.as_deref())?;
        let now = Utc::now();

        let mut rows: Vec<Appointment> = self
            .store
            .snapshot()
            .await
            .into_iter()
            .filter(|a| a.active)
            .filter(|a| authorization::visible_to(principal, a))
            .filter(|a| query.professional_id.map_or(true, |p| a.professional_id == p))
            .filter(|a| statuses.as_ref().map_or(true, |s| s.contains(&a.status)))
            .filter(|a| {
                query
                    .consultation_type
                    .map_or(true, |t| a.consultation_type == t)
            })
            .filter(|a| query.paid.map_or(true, |p| a.paid == p))
            .filter(|a| {
                query
                    .date_from
                    .map_or(true, |d| a.scheduled_start.date_naive() >= d)
            })
            .filter(|a| {
                query
                    .date_to
                    .map_or(true, |d| a.scheduled_start.date_naive() <= d)
            })
            .filter(|a| match query.period {
                None => true,
                Some(Period::Future) => a.scheduled_start > now,
                Some(Period::Past) => a.scheduled_start < now,
                Some(Period::Today) => a.scheduled_start.date_naive() == now.date_naive(),
            })
            .collect();

        rows.sort_by(|a, b| b.scheduled_start.cmp(&a.scheduled_start));
        debug!("Listing {} appointments for {}", rows.len(), principal.id);

        Ok(rows
            .into_iter()
            .map(|a| self.render_for(principal, a))
            .collect())
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.load_visible(principal, id).await?;
        if !authorization::can_perform(principal, AppointmentAction::Update, &current) {
            return Err(SchedulingError::Forbidden);
        }

        let now = Utc::now();
        let updated = self
            .store
            .modify(id, |current| {
                if current.is_terminal() {
                    return Err(SchedulingError::NotEditable(current.status));
                }

                let mut next = current.clone();
                let mut errors = Vec::new();

                if let Some(name) = &request.patient_name {
                    errors.extend(validation::check_patient_name(name));
                    next.patient_name = name.trim().to_string();
                }
                if let Some(phone) = &request.patient_phone {
                    errors.extend(validation::check_patient_phone(phone));
                    next.patient_phone = phone.clone();
                }
                if let Some(email) = &request.patient_email {
                    errors.extend(validation::check_patient_email(email));
                    next.patient_email = Some(email.clone());
                }
                if let Some(reason) = &request.reason {
                    errors.extend(validation::check_text_len(
                        "reason",
                        reason,
                        validation::MAX_REASON_LEN,
                    ));
                    next.reason = Some(reason.clone());
                }
                if let Some(notes) = &request.notes {
                    errors.extend(validation::check_text_len(
                        "notes",
                        notes,
                        validation::MAX_NOTES_LEN,
                    ));
                    next.notes = Some(notes.clone());
                }
                if let Some(internal_notes) = &request.internal_notes {
                    errors.extend(validation::check_text_len(
                        "internal_notes",
                        internal_notes,
                        validation::MAX_NOTES_LEN,
                    ));
                    next.internal_notes = Some(internal_notes.clone());
                }
                if let Some(amount) = request.amount {
                    errors.extend(validation::check_amount(amount));
                    next.amount = Some(amount);
                }
                if let Some(payment_method) = request.payment_method {
                    next.payment_method = Some(payment_method);
                }
                if let Some(paid) = request.paid {
                    next.paid = paid;
                }
                if let Some(consultation_type) = request.consultation_type {
                    next.consultation_type = consultation_type;
                }

                if request.changes_window() {
                    if let Some(start) = request.scheduled_start {
                        next.scheduled_start = start;
                        errors.extend(validation::check_future_start(start, now));
                    }
                    if let Some(minutes) = request.duration_minutes {
                        errors.extend(validation::check_duration(minutes));
                        next.duration_minutes = minutes;
                    }
                    next.scheduled_end = match request.scheduled_end {
                        Some(end) => end,
                        None => Appointment::derived_end(
                            next.scheduled_start,
                            next.duration_minutes,
                        ),
                    };
                    errors.extend(validation::check_window(
                        next.scheduled_start,
                        next.scheduled_end,
                    ));
                }

                if !errors.is_empty() {
                    return Err(SchedulingError::Validation(errors));
                }

                next.updated_at = now;
                Ok(next)
            })
            .await?;

        Ok(self.render_for(principal, updated))
    }

    /// Guarded lifecycle transition. Reschedule is the only action that
    /// produces a second record; its new window is conflict-checked in the
    /// same atomic unit that marks the original.
    pub async fn transition(
        &self,
        principal: &Principal,
        id: Uuid,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, SchedulingError> {
        let current = self.load_visible(principal, id).await?;
        let action = request.action();
        if !authorization::can_perform(principal, AppointmentAction::Transition(action), &current)
        {
            return Err(SchedulingError::Forbidden);
        }

        match request {
            TransitionRequest::Confirm
            | TransitionRequest::Start
            | TransitionRequest::Finish
            | TransitionRequest::NoShow => {
                let updated = self
                    .store
                    .modify(id, |current| {
                        self.lifecycle.guard(current.status, action)?;
                        let now = Utc::now();
                        let mut next = current.clone();
                        next.status = self.lifecycle.target(action);
                        if action == TransitionAction::Finish {
                            next.scheduled_end = now;
                        }
                        next.updated_at = now;
                        Ok(next)
                    })
                    .await?;

                info!("Appointment {} transitioned via {}", id, action);
                Ok(TransitionOutcome::Updated(
                    self.render_for(principal, updated),
                ))
            }

            TransitionRequest::Cancel {
                reason,
                cancelled_by,
            } => {
                let reason = reason.trim().to_string();
                if reason.is_empty() {
                    return Err(SchedulingError::field(
                        "reason",
                        "cancellation reason is required",
                    ));
                }
                if let Some(err) =
                    validation::check_text_len("reason", &reason, validation::MAX_REASON_LEN)
                {
                    return Err(SchedulingError::Validation(vec![err]));
                }

                let by = cancelled_by.unwrap_or_else(|| default_cancelled_by(principal));

                let updated = self
                    .store
                    .modify(id, |current| {
                        self.lifecycle.guard(current.status, TransitionAction::Cancel)?;
                        let now = Utc::now();
                        let mut next = current.clone();
                        next.status = AppointmentStatus::Cancelled;
                        next.cancellation_reason = Some(reason.clone());
                        next.cancelled_by = Some(by);
                        next.cancelled_at = Some(now);
                        next.updated_at = now;
                        Ok(next)
                    })
                    .await?;

                info!("Appointment {} cancelled by {:?}", id, by);
                Ok(TransitionOutcome::Updated(
                    self.render_for(principal, updated),
                ))
            }

            TransitionRequest::Reschedule {
                new_scheduled_start,
                reason,
            } => {
                let now = Utc::now();
                if new_scheduled_start <= now {
                    return Err(SchedulingError::field(
                        "new_scheduled_start",
                        "appointment must be rescheduled to a future time",
                    ));
                }

                let (original, replacement) = self
                    .store
                    .reschedule(id, |current| {
                        self.lifecycle
                            .guard(current.status, TransitionAction::Reschedule)?;

                        let mut original = current.clone();
                        original.status = AppointmentStatus::Rescheduled;
                        original.updated_at = now;

                        let notes = match reason.as_deref() {
                            Some(reason) => format!("Rescheduled. Reason: {}", reason),
                            None => "Rescheduled".to_string(),
                        };

                        let replacement = Appointment {
                            id: Uuid::new_v4(),
                            professional_id: current.professional_id,
                            scheduled_start: new_scheduled_start,
                            duration_minutes: current.duration_minutes,
                            scheduled_end: Appointment::derived_end(
                                new_scheduled_start,
                                current.duration_minutes,
                            ),
                            consultation_type: current.consultation_type,
                            status: AppointmentStatus::Scheduled,
                            patient_name: current.patient_name.clone(),
                            patient_phone: current.patient_phone.clone(),
                            patient_email: current.patient_email.clone(),
                            patient_account_id: current.patient_account_id,
                            reason: current.reason.clone(),
                            notes: Some(notes),
                            internal_notes: None,
                            amount: current.amount,
                            payment_method: current.payment_method,
                            paid: false,
                            cancellation_reason: None,
                            cancelled_by: None,
                            cancelled_at: None,
                            origin_appointment_id: Some(current.id),
                            created_at: now,
                            updated_at: now,
                            active: true,
                        };

                        Ok((original, replacement))
                    })
                    .await?;

                info!(
                    "Appointment {} rescheduled into {}",
                    original.id, replacement.id
                );
                Ok(TransitionOutcome::Rescheduled {
                    original: self.render_for(principal, original),
                    replacement: self.render_for(principal, replacement),
                })
            }
        }
    }

    /// Soft delete: history is retained, only the active flag flips.
    pub async fn soft_delete(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<(), SchedulingError> {
        let current = self.load_visible(principal, id).await?;
        if !authorization::can_perform(principal, AppointmentAction::Delete, &current) {
            return Err(SchedulingError::Forbidden);
        }

        self.store
            .modify(id, |current| {
                if matches!(
                    current.status,
                    AppointmentStatus::InProgress | AppointmentStatus::Completed
                ) {
                    return Err(SchedulingError::NotDeletable(current.status));
                }
                let mut next = current.clone();
                next.active = false;
                next.updated_at = Utc::now();
                Ok(next)
            })
            .await?;

        info!("Appointment {} deactivated", id);
        Ok(())
    }

    /// Aggregate stats over the rows visible to the principal.
    pub async fn stats(&self, principal: &Principal) -> Result<AppointmentStats, SchedulingError> {
        let now = Utc::now();
        let today = now.date_naive();

        let rows: Vec<Appointment> = self
            .store
            .snapshot()
            .await
            .into_iter()
            .filter(|a| a.active)
            .filter(|a| authorization::visible_to(principal, a))
            .collect();

        let in_current_month = |a: &Appointment| {
            a.scheduled_start.year() == now.year() && a.scheduled_start.month() == now.month()
        };

        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for appointment in &rows {
            *by_status.entry(appointment.status.to_string()).or_default() += 1;
            *by_type
                .entry(appointment.consultation_type.to_string())
                .or_default() += 1;
        }

        let month_revenue: Decimal = rows
            .iter()
            .filter(|a| a.paid && in_current_month(a))
            .filter_map(|a| a.amount)
            .sum();

        Ok(AppointmentStats {
            total: rows.len(),
            today: rows
                .iter()
                .filter(|a| a.scheduled_start.date_naive() == today)
                .count(),
            current_month: rows.iter().filter(|a| in_current_month(a)).count(),
            by_status,
            by_type,
            month_revenue,
        })
    }

    /// Conflict probe for admins and the owning professional.
    pub async fn check_conflicts(
        &self,
        principal: &Principal,
        query: &ConflictCheckQuery,
    ) -> Result<ConflictCheckResponse, SchedulingError> {
        let allowed = principal.is_admin()
            || principal.owned_professional_id() == Some(query.professional_id);
        if !allowed {
            return Err(SchedulingError::Forbidden);
        }

        let snapshot = self.store.snapshot().await;
        let conflicting = conflict::find_conflicts(
            snapshot.iter(),
            query.professional_id,
            query.start,
            query.end,
            query.exclude_appointment_id,
        );

        Ok(ConflictCheckResponse {
            has_conflict: !conflicting.is_empty(),
            conflicting_appointments: conflicting,
        })
    }

    async fn load_visible(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self
            .store
            .get(id)
            .await
            .filter(|a| a.active)
            .ok_or(SchedulingError::NotFound)?;

        // Existence is hidden from principals who cannot read the row.
        if !authorization::visible_to(principal, &appointment) {
            return Err(SchedulingError::NotFound);
        }

        Ok(appointment)
    }

    fn render_for(&self, principal: &Principal, appointment: Appointment) -> Appointment {
        if principal.role == Role::Patient {
            appointment.redacted_for_patient()
        } else {
            appointment
        }
    }
}

fn default_cancelled_by(principal: &Principal) -> CancelledBy {
    match principal.role {
        Role::Patient => CancelledBy::Patient,
        Role::Professional => CancelledBy::Professional,
        Role::Admin => CancelledBy::System,
    }
}

fn parse_status_filter(
    raw: Option<&str>,
) -> Result<Option<Vec<AppointmentStatus>>, SchedulingError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut statuses = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match AppointmentStatus::parse(part) {
            Some(status) => statuses.push(status),
            None => {
                return Err(SchedulingError::field(
                    "status",
                    format!("unknown status `{part}`"),
                ))
            }
        }
    }
    Ok(Some(statuses))
}
