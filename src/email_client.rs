/// Email client for the contact form.
///
/// Forwards visitor messages to the configured site owner address through
/// an HTTP email relay. Auth never goes through here.

use serde::Serialize;

use crate::configuration::EmailSettings;
use crate::error::{AppError, EmailError};
use crate::validators::is_valid_email;

#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: String,
    recipient: String,
}

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: String,
    subject: String,
    text: String,
}

impl EmailClient {
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, AppError> {
        let sender = is_valid_email(&settings.sender)?;
        let recipient = is_valid_email(&settings.recipient)?;

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url: settings.base_url.clone(),
            sender,
            recipient,
        })
    }

    /// Forward a contact message to the site owner.
    pub async fn forward_contact_message(
        &self,
        visitor_name: &str,
        visitor_email: &str,
        message: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/email", self.base_url);
        let request = SendEmailRequest {
            from: self.sender.clone(),
            to: self.recipient.clone(),
            subject: format!("New Contact Message from {}", visitor_name),
            text: format!("From: {} <{}>\n\n{}", visitor_name, visitor_email, message),
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach email service: {}", e);
                AppError::Email(EmailError::ServiceUnavailable(e.to_string()))
            })?
            .error_for_status()
            .map_err(|e| {
                tracing::error!("Email service returned error: {}", e);
                AppError::Email(EmailError::SendFailed(e.to_string()))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::EmailSettings;

    #[test]
    fn valid_settings_build_a_client() {
        let settings = EmailSettings {
            base_url: "http://localhost:8025".to_string(),
            sender: "noreply@jobtrack.dev".to_string(),
            recipient: "owner@jobtrack.dev".to_string(),
        };
        assert!(EmailClient::from_settings(&settings).is_ok());
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let settings = EmailSettings {
            base_url: "http://localhost:8025".to_string(),
            sender: "not-an-email".to_string(),
            recipient: "owner@jobtrack.dev".to_string(),
        };
        assert!(EmailClient::from_settings(&settings).is_err());
    }
}
