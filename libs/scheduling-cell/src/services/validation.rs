// libs/scheduling-cell/src/services/validation.rs
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::models::FieldError;

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const MAX_DURATION_MINUTES: i32 = 480;

pub const MAX_NAME_LEN: usize = 150;
pub const MAX_REASON_LEN: usize = 500;
pub const MAX_NOTES_LEN: usize = 1000;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

fn max_amount() -> Decimal {
    // 999999.99, the ceiling the billing side accepts
    Decimal::new(99_999_999, 2)
}

pub fn check_duration(minutes: i32) -> Option<FieldError> {
    if minutes <= 0 {
        return Some(FieldError::new(
            "duration_minutes",
            "duration must be greater than zero",
        ));
    }
    if minutes > MAX_DURATION_MINUTES {
        return Some(FieldError::new(
            "duration_minutes",
            format!("duration cannot exceed {} minutes", MAX_DURATION_MINUTES),
        ));
    }
    None
}

pub fn check_future_start(start: DateTime<Utc>, now: DateTime<Utc>) -> Option<FieldError> {
    if start <= now {
        return Some(FieldError::new(
            "scheduled_start",
            "appointment must be scheduled for a future time",
        ));
    }
    None
}

pub fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<FieldError> {
    if end < start {
        return Some(FieldError::new(
            "scheduled_end",
            "scheduled end cannot precede scheduled start",
        ));
    }
    None
}

pub fn check_amount(amount: Decimal) -> Option<FieldError> {
    if amount < Decimal::ZERO {
        return Some(FieldError::new("amount", "amount cannot be negative"));
    }
    if amount > max_amount() {
        return Some(FieldError::new("amount", "amount is too high"));
    }
    None
}

pub fn check_patient_name(name: &str) -> Option<FieldError> {
    let name = name.trim();
    if name.len() < 2 {
        return Some(FieldError::new(
            "patient_name",
            "patient name must have at least 2 characters",
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Some(FieldError::new("patient_name", "patient name is too long"));
    }
    None
}

/// Phone shape check: 10 or 11 digits once punctuation is stripped.
pub fn check_patient_phone(phone: &str) -> Option<FieldError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 && digits.len() != 11 {
        return Some(FieldError::new(
            "patient_phone",
            "phone must have 10 or 11 digits",
        ));
    }
    None
}

pub fn check_patient_email(email: &str) -> Option<FieldError> {
    if !email_regex().is_match(email.trim()) {
        return Some(FieldError::new("patient_email", "invalid email address"));
    }
    None
}

pub fn check_text_len(field: &'static str, value: &str, max: usize) -> Option<FieldError> {
    if value.len() > max {
        return Some(FieldError::new(field, format!("must not exceed {max} characters")));
    }
    None
}
