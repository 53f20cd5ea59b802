use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub directory_url: String,
    pub directory_api_key: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            directory_url: env::var("DIRECTORY_URL")
                .unwrap_or_else(|_| {
                    warn!("DIRECTORY_URL not set, using empty value");
                    String::new()
                }),
            directory_api_key: env::var("DIRECTORY_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DIRECTORY_API_KEY not set, using empty value");
                    String::new()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty() && !self.directory_url.is_empty()
    }
}
