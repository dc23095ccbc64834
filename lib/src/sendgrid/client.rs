use std::time::Duration;

use super::api;

use crate::config::Settings;
use crate::email::Email;
use crate::mailer::Mailer;
use crate::Error;

/// Blocking client for the SendGrid v3 mail API
pub struct SendGridClient {
    api_key: String,
    base_url: url::Url,
    client: reqwest::blocking::Client,
}

impl SendGridClient {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout))
            .build()?;

        Ok(Self {
            api_key: settings.sendgrid_api_key.clone(),
            base_url: settings.sendgrid_api_url.clone(),
            client,
        })
    }

    #[inline]
    fn request<T: serde::Serialize>(
        &self,
        endpoint: api::Endpoint,
        body: &T,
    ) -> Result<reqwest::blocking::Response, Error> {
        let url = api::build_endpoint_url(&self.base_url, endpoint)?;

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;

        // Map response into an error if applicable
        api::map_status(resp)
    }

    /// Send a single email. Returns the HTTP status code (202 when SendGrid
    /// queued the message).
    pub fn send_email(&self, email: &Email) -> Result<u16, Error> {
        let body = api::MailSendRequest::from(email);

        log::debug!(
            "POST {} ({} bytes attached)",
            api::MAIL_SEND_PATH,
            email.attachment.size
        );

        let resp = self.request(api::Endpoint::MailSend, &body)?;

        Ok(resp.status().as_u16())
    }
}

impl Mailer for SendGridClient {
    fn send(&self, email: &Email) -> Result<u16, Error> {
        self.send_email(email)
    }
}
