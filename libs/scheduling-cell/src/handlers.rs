// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_models::pagination::{Page, DEFAULT_PAGE_SIZE};

use crate::models::{
    AppointmentListQuery, CancelAppointmentRequest, ConflictCheckQuery, CreateAppointmentRequest,
    RescheduleAppointmentRequest, SchedulingError, TransitionOutcome, TransitionRequest,
    UpdateAppointmentRequest,
};
use crate::services::scheduling::SchedulingService;
use crate::state::SchedulingState;

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::Validation(errors) => {
            let mut fields = serde_json::Map::new();
            for err in errors {
                fields.insert(err.field, Value::String(err.message));
            }
            AppError::Validation(Value::Object(fields))
        }
        SchedulingError::SlotConflict => {
            AppError::Conflict("appointment slot conflicts with an existing booking".to_string())
        }
        SchedulingError::InvalidTransition { current, action } => AppError::BadRequest(format!(
            "cannot {} an appointment in status {}",
            action, current
        )),
        SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        SchedulingError::Forbidden => {
            AppError::Forbidden("Not authorized to perform this action on this appointment".to_string())
        }
        SchedulingError::NotEditable(status) => {
            AppError::BadRequest(format!("appointment in status {} cannot be edited", status))
        }
        SchedulingError::NotDeletable(status) => {
            AppError::BadRequest(format!("appointment in status {} cannot be deleted", status))
        }
        SchedulingError::Directory(msg) => AppError::ExternalService(msg),
    }
}

// ==============================================================================
// APPOINTMENT CRUD HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<SchedulingState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = SchedulingService::new(&state);

    let appointment = service
        .create(&principal, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<SchedulingState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<AppointmentListQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);

    let appointments = service
        .list(&principal, &query)
        .await
        .map_err(map_scheduling_error)?;

    let page = Page::from_items(
        appointments,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        uri.path(),
        uri.query().unwrap_or(""),
    );

    Ok(Json(json!(page)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);

    let appointment = service
        .get(&principal, appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);

    let appointment = service
        .update(&principal, appointment_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<StatusCode, AppError> {
    let service = SchedulingService::new(&state);

    service
        .soft_delete(&principal, appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// LIFECYCLE TRANSITION HANDLERS
// ==============================================================================

async fn run_transition(
    state: SchedulingState,
    principal: Principal,
    appointment_id: Uuid,
    request: TransitionRequest,
    message: &str,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);

    let outcome = service
        .transition(&principal, appointment_id, request)
        .await
        .map_err(map_scheduling_error)?;

    match outcome {
        TransitionOutcome::Updated(appointment) => Ok(Json(json!({
            "message": message,
            "appointment": appointment,
        }))),
        TransitionOutcome::Rescheduled {
            original,
            replacement,
        } => Ok(Json(json!({
            "message": message,
            "appointment": original,
            "new_appointment": replacement,
        }))),
    }
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    run_transition(
        state,
        principal,
        appointment_id,
        TransitionRequest::Confirm,
        "Appointment confirmed",
    )
    .await
}

#[axum::debug_handler]
pub async fn start_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    run_transition(
        state,
        principal,
        appointment_id,
        TransitionRequest::Start,
        "Appointment started",
    )
    .await
}

#[axum::debug_handler]
pub async fn finish_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    run_transition(
        state,
        principal,
        appointment_id,
        TransitionRequest::Finish,
        "Appointment finished",
    )
    .await
}

#[axum::debug_handler]
pub async fn no_show_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    run_transition(
        state,
        principal,
        appointment_id,
        TransitionRequest::NoShow,
        "Appointment marked as no-show",
    )
    .await
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    run_transition(
        state,
        principal,
        appointment_id,
        TransitionRequest::Cancel {
            reason: request.reason,
            cancelled_by: request.cancelled_by,
        },
        "Appointment cancelled",
    )
    .await
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    run_transition(
        state,
        principal,
        appointment_id,
        TransitionRequest::Reschedule {
            new_scheduled_start: request.new_scheduled_start,
            reason: request.reason,
        },
        "Appointment rescheduled",
    )
    .await
}

// ==============================================================================
// UTILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn appointment_stats(
    State(state): State<SchedulingState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);

    let stats = service
        .stats(&principal)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(stats)))
}

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(state): State<SchedulingState>,
    Query(query): Query<ConflictCheckQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);

    let response = service
        .check_conflicts(&principal, &query)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(response)))
}
