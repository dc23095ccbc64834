use std::fmt;

use reqwest::StatusCode;

use serde::{Deserialize, Serialize};

use crate::email::Email;
use crate::Error;

pub(crate) const MAIL_SEND_PATH: &str = "mail/send";

pub enum Endpoint {
    MailSend,
}

#[inline]
pub fn build_endpoint_url(base: &url::Url, endpoint: Endpoint) -> Result<url::Url, Error> {
    match endpoint {
        Endpoint::MailSend => Ok(base.join(MAIL_SEND_PATH)?),
    }
}

/// Single entry of the `errors` list SendGrid returns on a rejected request
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    pub field: Option<String>,
    pub help: Option<String>,
}

/// Error body of a rejected request: `{"errors": [...]}`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ApiErrors {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

impl ApiErrors {
    /// Parse an error body. Anything that isn't SendGrid's JSON shape is kept
    /// verbatim as a single message.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Self>(body) {
            Ok(errors) if !errors.errors.is_empty() => errors,
            _ => Self {
                errors: vec![ApiError {
                    message: body.trim().to_string(),
                    ..Default::default()
                }],
            },
        }
    }
}

impl fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| match e.field {
                Some(ref field) => format!("{} (field: {})", e.message, field),
                None => e.message.clone(),
            })
            .collect();

        f.write_str(&messages.join("; "))
    }
}

/// Map a non-success SendGrid response to a pixmail error
pub fn map_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    let errors = if body.trim().is_empty() {
        ApiErrors::from_body(status.canonical_reason().unwrap_or("unknown error"))
    } else {
        ApiErrors::from_body(&body)
    };
    let code = status.as_u16();

    match status {
        StatusCode::BAD_REQUEST => Err(Error::BadRequest { status: code, errors }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(Error::Unauthorized { status: code, errors })
        }
        StatusCode::PAYLOAD_TOO_LARGE => Err(Error::PayloadTooLarge { status: code, errors }),
        StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited { status: code, errors }),
        _ => Err(Error::Api { status: code, errors }),
    }
}

#[derive(Serialize, Debug)]
pub struct Address<'a> {
    pub email: &'a str,
}

#[derive(Serialize, Debug)]
pub struct Personalization<'a> {
    pub to: Vec<Address<'a>>,
}

#[derive(Serialize, Debug)]
pub struct Content<'a> {
    #[serde(rename = "type")]
    pub type_: &'a str,
    pub value: &'a str,
}

#[derive(Serialize, Debug)]
pub struct Attachment<'a> {
    /// Base64-encoded file content
    pub content: String,
    pub filename: &'a str,
    #[serde(rename = "type")]
    pub type_: &'a str,
    pub disposition: &'a str,
}

/// Request body for `POST /v3/mail/send`
#[derive(Serialize, Debug)]
pub struct MailSendRequest<'a> {
    pub personalizations: Vec<Personalization<'a>>,
    pub from: Address<'a>,
    pub subject: &'a str,
    pub content: Vec<Content<'a>>,
    pub attachments: Vec<Attachment<'a>>,
}

impl<'a> From<&'a Email> for MailSendRequest<'a> {
    fn from(email: &'a Email) -> Self {
        let attachment = &email.attachment;

        Self {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: &email.recipient,
                }],
            }],
            from: Address {
                email: &email.sender,
            },
            subject: &email.subject,
            content: vec![Content {
                type_: "text/html",
                value: &email.body_html,
            }],
            attachments: vec![Attachment {
                content: attachment.encoded(),
                filename: &attachment.name,
                type_: &attachment.mime,
                disposition: attachment.disposition.as_str(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::email::{Attachment as EmailAttachment, Disposition};

    #[test]
    fn request_shape() {
        let email = Email {
            sender: "me@example.com".to_string(),
            recipient: "frame@pix-star.com".to_string(),
            subject: "Video Upload 0".to_string(),
            body_html: "Video Upload 0".to_string(),
            attachment: EmailAttachment {
                name: "videos/a.mp4".to_string(),
                mime: "video/mp4".to_string(),
                disposition: Disposition::Attachment,
                size: 3,
                data: b"abc".to_vec(),
            },
        };

        let value = serde_json::to_value(MailSendRequest::from(&email)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "personalizations": [{"to": [{"email": "frame@pix-star.com"}]}],
                "from": {"email": "me@example.com"},
                "subject": "Video Upload 0",
                "content": [{"type": "text/html", "value": "Video Upload 0"}],
                "attachments": [{
                    "content": "YWJj",
                    "filename": "videos/a.mp4",
                    "type": "video/mp4",
                    "disposition": "attachment"
                }]
            })
        );
    }

    #[test]
    fn parse_error_body() {
        let body = r#"{"errors":[{"message":"The from address does not match a verified Sender Identity.","field":"from","help":null}]}"#;
        let errors = ApiErrors::from_body(body);

        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.errors[0].field.as_deref(), Some("from"));
        assert_eq!(
            errors.to_string(),
            "The from address does not match a verified Sender Identity. (field: from)"
        );
    }

    #[test]
    fn unparsable_error_body() {
        let errors = ApiErrors::from_body("upstream connect error\n");

        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.to_string(), "upstream connect error");
    }

    #[test]
    fn endpoint_url() {
        let base = url::Url::parse("https://api.sendgrid.com/v3/").unwrap();
        let url = build_endpoint_url(&base, Endpoint::MailSend).unwrap();

        assert_eq!(url.as_str(), "https://api.sendgrid.com/v3/mail/send");
    }
}
