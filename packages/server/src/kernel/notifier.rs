//! Production notifier: transactional email over HTTP, SMS via Eskiz.

use async_trait::async_trait;
use eskiz::EskizService;
use reqwest::Client;
use serde_json::json;

use crate::kernel::traits::{BaseNotifier, NotifierError};

const EMAIL_SEND_URL: &str = "https://send.api.mailtrap.io/api/send";

pub struct HttpNotifier {
    client: Client,
    email_api_token: String,
    from_name: String,
    from_email: String,
    sms: EskizService,
}

impl HttpNotifier {
    /// `email_from` is the display form, e.g. `Almond <mailtrap@almond.uz>`.
    pub fn new(email_api_token: String, email_from: &str, sms: EskizService) -> Self {
        let (from_name, from_email) = split_from(email_from);
        Self {
            client: Client::new(),
            email_api_token,
            from_name,
            from_email,
            sms,
        }
    }
}

#[async_trait]
impl BaseNotifier for HttpNotifier {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(EMAIL_SEND_URL)
            .bearer_auth(&self.email_api_token)
            .json(&json!({
                "from": { "email": self.from_email, "name": self.from_name },
                "to": [{ "email": to }],
                "subject": subject,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| NotifierError::Failed(format!("email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::Failed(format!(
                "email provider returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn send_sms(
        &self,
        country_code: &str,
        phone_number: &str,
        text: &str,
    ) -> Result<(), NotifierError> {
        let mobile_phone = full_number(country_code, phone_number);
        self.sms
            .send_sms(&mobile_phone, text)
            .await
            .map_err(|e| NotifierError::Failed(e.to_string()))
    }
}

/// "Name <addr>" -> (Name, addr); a bare address gets itself as name.
fn split_from(email_from: &str) -> (String, String) {
    if let (Some(open), Some(close)) = (email_from.find('<'), email_from.rfind('>')) {
        if open < close {
            let name = email_from[..open].trim().to_string();
            let email = email_from[open + 1..close].trim().to_string();
            return (name, email);
        }
    }
    (email_from.trim().to_string(), email_from.trim().to_string())
}

/// Compose the international number Eskiz expects. Only Uzbekistan is
/// live today; other country codes pass through for forward
/// compatibility with the gateway's validation.
fn full_number(country_code: &str, phone_number: &str) -> String {
    match country_code {
        "uz" => format!("+998{}", phone_number),
        other => format!("+{}{}", other, phone_number),
    }
}
