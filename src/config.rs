use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Realtime configuration
    pub frontend_url: String,
    pub identity_cookie: String,

    // Email configuration
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub admin_email: Option<String>,
    pub email_from: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3001,
            environment: "development".to_string(),
            log_level: "notify_relay=debug,tower_http=debug".to_string(),

            frontend_url: "http://localhost:3000".to_string(),
            identity_cookie: "user-id".to_string(),

            resend_api_key: None,
            resend_api_url: "https://api.resend.com".to_string(),
            admin_email: None,
            email_from: "Quiosco Digital <noreply@transactional.kristall.app>".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: match env::var("PORT") {
                Ok(port) => port.parse()?,
                Err(_) => defaults.server_port,
            },
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),

            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            identity_cookie: env::var("IDENTITY_COOKIE").unwrap_or(defaults.identity_cookie),

            resend_api_key: env::var("RESEND_API_KEY").ok().filter(|key| !key.is_empty()),
            resend_api_url: env::var("RESEND_API_URL").unwrap_or(defaults.resend_api_url),
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|email| !email.is_empty()),
            email_from: env::var("EMAIL_FROM").unwrap_or(defaults.email_from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
