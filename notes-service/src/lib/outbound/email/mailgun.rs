use async_trait::async_trait;

use crate::config::EmailConfig;
use crate::domain::auth::errors::EmailSendError;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::ports::VerificationCodeSender;

/// Verification-code delivery through the Mailgun messages API.
///
/// No retry: a failed send surfaces immediately and the caller decides.
/// Request deadlines belong here, not in the domain service.
pub struct MailgunEmailClient {
    http_client: reqwest::Client,
    api_base_url: String,
    api_key: String,
    domain: String,
    from_address: String,
}

impl MailgunEmailClient {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            domain: config.domain.clone(),
            from_address: config.from_address.clone(),
        }
    }
}

#[async_trait]
impl VerificationCodeSender for MailgunEmailClient {
    async fn send_verification_code(
        &self,
        to: &EmailAddress,
        code: &str,
    ) -> Result<(), EmailSendError> {
        let url = format!("{}/{}/messages", self.api_base_url, self.domain);

        let form = [
            ("from", format!("Simple Notes <{}>", self.from_address)),
            ("to", to.as_str().to_string()),
            ("subject", "Your verification code".to_string()),
            (
                "text",
                format!("Your verification code is {code}. It expires in 10 minutes."),
            ),
        ];

        let response = self
            .http_client
            .post(&url)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| EmailSendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            tracing::error!(
                status = response.status().as_u16(),
                "Failed to send verification email"
            );
            return Err(EmailSendError::SendFailed(format!(
                "Email provider returned status {}",
                response.status()
            )));
        }

        tracing::info!("Verification email sent");

        Ok(())
    }
}
