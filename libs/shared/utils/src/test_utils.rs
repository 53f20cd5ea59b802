use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Principal, Role};

pub struct TestConfig {
    pub jwt_secret: String,
    pub directory_url: String,
    pub directory_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            directory_url: "http://localhost:9100".to_string(),
            directory_api_key: "test-directory-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            directory_url: self.directory_url.clone(),
            directory_api_key: self.directory_api_key.clone(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestPrincipal {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub professional_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl TestPrincipal {
    pub fn admin(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: Role::Admin,
            professional_id: None,
            patient_id: None,
        }
    }

    pub fn professional(email: &str, professional_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: Role::Professional,
            professional_id: Some(professional_id),
            patient_id: None,
        }
    }

    pub fn patient(email: &str, patient_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: Role::Patient,
            professional_id: None,
            patient_id: Some(patient_id),
        }
    }

    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: self.role,
            professional_id: self.professional_id,
            patient_id: self.patient_id,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(
        principal: &TestPrincipal,
        secret: &str,
        exp_hours: Option<i64>,
    ) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let role = match principal.role {
            Role::Admin => "admin",
            Role::Professional => "professional",
            Role::Patient => "patient",
        };

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": principal.id,
            "email": principal.email,
            "role": role,
            "professional_id": principal.professional_id,
            "patient_id": principal.patient_id,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn auth_header(principal: &TestPrincipal, secret: &str) -> String {
        format!("Bearer {}", Self::create_test_token(principal, secret, None))
    }
}
