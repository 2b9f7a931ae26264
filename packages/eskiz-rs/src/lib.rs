// https://documenter.getpostman.com/view/663428/RzfmES4z - Eskiz SMS API

use reqwest::Client;
use serde::Deserialize;

const LOGIN_URL: &str = "https://notify.eskiz.uz/api/auth/login";
const SEND_URL: &str = "https://notify.eskiz.uz/api/message/sms/send";

#[derive(Debug, Clone)]
pub struct EskizOptions {
    pub email: String,
    pub password: String,
    /// Sender identifier registered with Eskiz.
    pub from: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

/// Client for the Eskiz SMS gateway.
///
/// Eskiz issues short-lived bearer tokens from the login endpoint, so
/// every send performs a login first. Fine for the low volume of
/// verification SMS; token caching can come later if volume grows.
#[derive(Debug, Clone)]
pub struct EskizService {
    options: EskizOptions,
    client: Client,
}

impl EskizService {
    pub fn new(options: EskizOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    async fn login(&self) -> Result<String, &'static str> {
        let res = self
            .client
            .post(LOGIN_URL)
            .json(&serde_json::json!({
                "email": self.options.email,
                "password": self.options.password,
            }))
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Eskiz login error ({}): {}", status, error_body);
                    return Err("Eskiz login failed");
                }

                match response.json::<LoginResponse>().await {
                    Ok(data) => Ok(data.data.token),
                    Err(e) => {
                        eprintln!("Failed to parse Eskiz login response: {}", e);
                        Err("Error parsing Eskiz login response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to Eskiz failed: {}", e);
                Err("Error reaching Eskiz")
            }
        }
    }

    /// Send an SMS to a full international number (e.g. "+998901234567").
    pub async fn send_sms(&self, mobile_phone: &str, message: &str) -> Result<(), &'static str> {
        let token = self.login().await?;

        let res = self
            .client
            .post(SEND_URL)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "mobile_phone": mobile_phone,
                "message": message,
                "from": self.options.from,
            }))
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Eskiz send error ({}): {}", status, error_body);
                    return Err("Eskiz returned an error");
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("Request to Eskiz failed: {}", e);
                Err("Error sending SMS")
            }
        }
    }
}
