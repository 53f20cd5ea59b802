#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use directory_cell::{Professional, StaticProfessionalDirectory};
use scheduling_cell::models::{
    Appointment, AppointmentStatus, ConsultationType, CreateAppointmentRequest,
};
use scheduling_cell::SchedulingState;
use shared_utils::test_utils::TestConfig;

pub fn listed_price() -> Decimal {
    Decimal::new(25000, 2) // 250.00
}

pub fn active_professional(id: Uuid) -> Professional {
    Professional {
        id,
        display_name: "Dr. Test".to_string(),
        profession: Some("psychologist".to_string()),
        is_active: true,
        listed_price: Some(listed_price()),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

pub fn inactive_professional(id: Uuid) -> Professional {
    Professional {
        is_active: false,
        ..active_professional(id)
    }
}

/// State backed by a fixed directory roster.
pub fn state_with(professionals: Vec<Professional>) -> SchedulingState {
    let mut directory = StaticProfessionalDirectory::new();
    for professional in professionals {
        directory = directory.with(professional);
    }
    SchedulingState::with_directory(TestConfig::default().to_arc(), Arc::new(directory))
}

pub fn state_with_professional(professional_id: Uuid) -> SchedulingState {
    state_with(vec![active_professional(professional_id)])
}

pub fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("valid RFC 3339 timestamp")
}

pub fn create_request(
    professional_id: Uuid,
    scheduled_start: DateTime<Utc>,
    duration_minutes: i32,
) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        professional_id,
        scheduled_start,
        duration_minutes: Some(duration_minutes),
        scheduled_end: None,
        consultation_type: None,
        patient_name: "Ana Souza".to_string(),
        patient_phone: "11987654321".to_string(),
        patient_email: Some("ana@example.com".to_string()),
        patient_account_id: None,
        reason: Some("first consultation".to_string()),
        notes: None,
        amount: None,
        payment_method: None,
    }
}

/// A fully-populated appointment row for gate and detector tests that do not
/// go through the service.
pub fn appointment_row(
    professional_id: Uuid,
    patient_account_id: Option<Uuid>,
    scheduled_start: DateTime<Utc>,
    duration_minutes: i32,
    status: AppointmentStatus,
) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        professional_id,
        scheduled_start,
        duration_minutes,
        scheduled_end: scheduled_start + Duration::minutes(duration_minutes as i64),
        consultation_type: ConsultationType::FirstVisit,
        status,
        patient_name: "Ana Souza".to_string(),
        patient_phone: "11987654321".to_string(),
        patient_email: None,
        patient_account_id,
        reason: None,
        notes: None,
        internal_notes: None,
        amount: None,
        payment_method: None,
        paid: false,
        cancellation_reason: None,
        cancelled_by: None,
        cancelled_at: None,
        origin_appointment_id: None,
        created_at: now,
        updated_at: now,
        active: true,
    }
}
