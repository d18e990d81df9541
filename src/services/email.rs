use crate::{config::Config, error::{AppError, Result}};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const NEW_USER_SUBJECT: &str = "Nuevo usuario registrado";
const NEW_USER_HTML: &str = "<strong>Hola, se ha registrado un nuevo usuario en la plataforma Quiosco Digital.</strong>";

/// 事务邮件服务 (Resend HTTP API)
#[derive(Clone)]
pub struct EmailService {
    http_client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    admin_email: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
    name: Option<String>,
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: config.resend_api_url.trim_end_matches('/').to_string(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
            admin_email: config.admin_email.clone(),
        })
    }

    /// 通知管理员有新用户注册
    pub async fn send_new_user_alert(&self) -> Result<SendEmailResponse> {
        let admin_email = self
            .admin_email
            .as_deref()
            .ok_or_else(|| AppError::configuration("ADMIN_EMAIL is not configured"))?;

        self.send(admin_email, NEW_USER_SUBJECT, NEW_USER_HTML).await
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<SendEmailResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Email("Missing API key".to_string()))?;

        let request = SendEmailRequest {
            from: &self.from,
            to: vec![to],
            subject,
            html,
        };

        debug!("Sending email '{}' to {}", subject, to);

        let response = self
            .http_client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ProviderError>().await {
                Ok(ProviderError { message: Some(message), .. }) => message,
                Ok(ProviderError { name: Some(name), .. }) => name,
                _ => status.to_string(),
            };
            warn!("Email provider rejected request ({}): {}", status, detail);
            return Err(AppError::Email(detail));
        }

        let sent: SendEmailResponse = response.json().await?;
        info!("Email '{}' sent to {} (id: {})", subject, to, sent.id);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_admin_email() {
        let service = EmailService::new(&Config {
            resend_api_key: Some("re_test".to_string()),
            ..Config::default()
        })
        .unwrap();

        let result = service.send_new_user_alert().await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let service = EmailService::new(&Config {
            admin_email: Some("admin@example.com".to_string()),
            ..Config::default()
        })
        .unwrap();

        match service.send_new_user_alert().await {
            Err(AppError::Email(detail)) => assert_eq!(detail, "Missing API key"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.id)),
        }
    }
}
