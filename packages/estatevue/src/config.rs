use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::repository::DEFAULT_PAGE_SIZE;
use crate::session::AuthConfig;

/// How long the "listing created" confirmation stays before the wizard resets.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub page_size: u32,
    pub reset_delay: Duration,
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/graphql".to_string(),
            api_token: None,
            project_id: None,
            public_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            reset_delay: DEFAULT_RESET_DELAY,
            preferences_path: PathBuf::from(".estatevue/preferences.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        Ok(Self {
            api_url: env::var("ESTATEVUE_API_URL").unwrap_or(defaults.api_url),
            api_token: env::var("ESTATEVUE_API_TOKEN").ok(),
            project_id: env::var("ESTATEVUE_PROJECT_ID").ok(),
            public_key: env::var("ESTATEVUE_PUBLIC_KEY").ok(),
            page_size: match env::var("ESTATEVUE_PAGE_SIZE") {
                Ok(value) => value
                    .parse()
                    .context("ESTATEVUE_PAGE_SIZE must be a valid number")?,
                Err(_) => defaults.page_size,
            },
            reset_delay: match env::var("ESTATEVUE_RESET_DELAY_MS") {
                Ok(value) => Duration::from_millis(
                    value
                        .parse()
                        .context("ESTATEVUE_RESET_DELAY_MS must be a valid number")?,
                ),
                Err(_) => defaults.reset_delay,
            },
            preferences_path: env::var("ESTATEVUE_PREFERENCES")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_path),
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            project_id: self.project_id.clone(),
            public_key: self.public_key.clone(),
        }
    }
}
