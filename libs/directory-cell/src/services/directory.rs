use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use rust_decimal::Decimal;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::Professional;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("Professional not found")]
    NotFound,

    #[error("Directory service error: {0}")]
    Upstream(String),
}

/// Read-only access to the professional directory. The scheduling core never
/// mutates directory state; this seam is also where tests substitute a fixed
/// roster.
#[async_trait]
pub trait ProfessionalDirectory: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Professional, DirectoryError>;

    async fn is_active(&self, id: Uuid) -> Result<bool, DirectoryError> {
        match self.fetch(id).await {
            Ok(professional) => Ok(professional.is_active),
            Err(DirectoryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn listed_price(&self, id: Uuid) -> Result<Option<Decimal>, DirectoryError> {
        Ok(self.fetch(id).await?.listed_price)
    }
}

pub struct HttpProfessionalDirectory {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpProfessionalDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.directory_url.clone(),
            api_key: config.directory_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.api_key.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn request_professional(&self, id: Uuid) -> Result<Option<Professional>> {
        let url = format!("{}/professionals/{}", self.base_url, id);
        debug!("Fetching professional from {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.get_headers())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Directory error ({}): {}", status, error_text);
            return Err(anyhow!("Directory error ({}): {}", status, error_text));
        }

        let professional = response.json::<Professional>().await?;
        Ok(Some(professional))
    }
}

#[async_trait]
impl ProfessionalDirectory for HttpProfessionalDirectory {
    async fn fetch(&self, id: Uuid) -> Result<Professional, DirectoryError> {
        match self.request_professional(id).await {
            Ok(Some(professional)) => Ok(professional),
            Ok(None) => Err(DirectoryError::NotFound),
            Err(e) => Err(DirectoryError::Upstream(e.to_string())),
        }
    }
}

/// Fixed in-memory roster used by tests and local development.
#[derive(Default)]
pub struct StaticProfessionalDirectory {
    professionals: HashMap<Uuid, Professional>,
}

impl StaticProfessionalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, professional: Professional) -> Self {
        self.professionals.insert(professional.id, professional);
        self
    }
}

#[async_trait]
impl ProfessionalDirectory for StaticProfessionalDirectory {
    async fn fetch(&self, id: Uuid) -> Result<Professional, DirectoryError> {
        self.professionals
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }
}
