use std::error;
use std::fmt;
use std::path::Path;

use crate::sendgrid::ApiErrors;

/// All possible pixmail library errors.
///
/// Delivery failures (everything except `Config` and `Io`) carry enough
/// context to be logged as-is by the caller.
#[derive(Debug)]
pub enum Error {
    Config(String),
    Io { path: String, msg: String },
    BadRequest { status: u16, errors: ApiErrors },
    Unauthorized { status: u16, errors: ApiErrors },
    PayloadTooLarge { status: u16, errors: ApiErrors },
    RateLimited { status: u16, errors: ApiErrors },
    Api { status: u16, errors: ApiErrors },
    RequestTimeout,
    Request(String),
    Json(String),
}

impl Error {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Error::Io {
            path: path.display().to_string(),
            msg: err.to_string(),
        }
    }

    /// True if this error came back from (or on the way to) the delivery API.
    pub fn is_delivery(&self) -> bool {
        !matches!(*self, Error::Config(_) | Error::Io { .. })
    }

    /// HTTP status of a rejected request, if there was a response at all
    pub fn status(&self) -> Option<u16> {
        match *self {
            Error::BadRequest { status, .. }
            | Error::Unauthorized { status, .. }
            | Error::PayloadTooLarge { status, .. }
            | Error::RateLimited { status, .. }
            | Error::Api { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Config(ref msg) => write!(f, "Config: {}", msg),
            Error::Io { ref path, ref msg } => write!(f, "Io: {}: {}", path, msg),
            Error::BadRequest { status, ref errors } => {
                write!(f, "BadRequest ({}): {}", status, errors)
            }
            Error::Unauthorized { status, ref errors } => {
                write!(f, "Unauthorized ({}): {}", status, errors)
            }
            Error::PayloadTooLarge { status, ref errors } => {
                write!(f, "PayloadTooLarge ({}): {}", status, errors)
            }
            Error::RateLimited { status, ref errors } => {
                write!(f, "RateLimited ({}): {}", status, errors)
            }
            Error::Api { status, ref errors } => write!(f, "Api ({}): {}", status, errors),
            Error::RequestTimeout => f.write_str("RequestTimeout"),
            Error::Request(ref msg) => write!(f, "RequestError: {}", msg),
            Error::Json(ref msg) => write!(f, "JsonError: {}", msg),
        }
    }
}

impl error::Error for Error {}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid API URL: {}", err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::Json(err.to_string())
    }
}
