use std::path::Path;

use base64::Engine;

use crate::config::Settings;
use crate::Error;

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Generic Email and Attachment types.
/// Delivery backends translate these into their own wire format.
#[derive(Debug)]
pub struct Email {
    pub sender: String,
    pub recipient: String,
    pub subject: String,

    /// HTML body
    pub body_html: String,

    /// Exactly one attachment per email
    pub attachment: Attachment,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Default for Disposition {
    fn default() -> Self {
        Disposition::Attachment
    }
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

#[derive(Debug, Default)]
pub struct Attachment {
    /// Attachment filename, as presented to the recipient
    pub name: String,

    /// MIME type of attachment (e.g., video/mp4)
    pub mime: String,

    pub disposition: Disposition,

    /// Attachment size, in bytes
    pub size: usize,

    /// Raw attachment data
    pub data: Vec<u8>,
}

impl Email {
    pub fn new(settings: &Settings, subject: &str, body_html: &str, attachment: Attachment) -> Self {
        Self {
            sender: settings.sendgrid_sender_address.clone(),
            recipient: settings.recipient_address.clone(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
            attachment,
        }
    }
}

impl Attachment {
    /// Read a file fully into memory and wrap it as a regular attachment.
    ///
    /// The attachment name is the path string as given.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;

        let name = match path.to_str() {
            Some(name) => name.to_string(),
            None => {
                let lossy = path.to_string_lossy().into_owned();
                log::warn!("Attachment name is not valid UTF-8, sending as '{}'", lossy);
                lossy
            }
        };

        Ok(Self {
            name,
            mime: guess_mime(path),
            disposition: Disposition::Attachment,
            size: data.len(),
            data,
        })
    }

    /// Attachment data as standard (padded) base64
    pub fn encoded(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// Guess a MIME type from the file extension, falling back to
/// `application/octet-stream`.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_MIME)
        .to_string()
}
