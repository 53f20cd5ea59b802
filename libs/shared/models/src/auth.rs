use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Professional record owned by this account, present for role=professional.
    pub professional_id: Option<Uuid>,
    /// Linked patient account, present for role=patient.
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Professional,
    Patient,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "professional" => Some(Role::Professional),
            "patient" => Some(Role::Patient),
            _ => None,
        }
    }
}

/// The authenticated actor attached to every request by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub professional_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The professional record this principal owns, if any.
    pub fn owned_professional_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Professional => self.professional_id,
            _ => None,
        }
    }

    /// The patient account linked to this principal, if any.
    pub fn linked_patient_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Patient => self.patient_id,
            _ => None,
        }
    }
}
