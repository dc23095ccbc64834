use std::collections::HashMap;

use serde::Deserialize;

use crate::Error;

pub const DEFAULT_PATH: &str = "pixmail.toml";
pub const DEFAULT_API_URL: &str = "https://api.sendgrid.com/v3/";

// Request timeout, in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// Settings as they come out of the config sources, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    sendgrid_api_key: Option<String>,
    sendgrid_sender_address: Option<String>,
    recipient_address: Option<String>,
    sendgrid_api_url: Option<String>,
    request_timeout: Option<u64>,
}

/// Validated pixmail settings. Built once at startup and passed to
/// whatever needs them.
#[derive(Clone, Debug)]
pub struct Settings {
    pub sendgrid_api_key: String,
    pub sendgrid_sender_address: String,
    pub recipient_address: String,
    pub sendgrid_api_url: url::Url,
    pub request_timeout: u64,
}

impl Settings {
    /// Build settings directly, e.g. for tests or embedding.
    pub fn new(api_key: &str, sender: &str, recipient: &str) -> Result<Self, Error> {
        RawSettings {
            sendgrid_api_key: Some(api_key.to_string()),
            sendgrid_sender_address: Some(sender.to_string()),
            recipient_address: Some(recipient.to_string()),
            ..Default::default()
        }
        .validate()
    }

    /// Point the client at a different API root (must end up as a base URL).
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, Error> {
        self.sendgrid_api_url = parse_base_url(api_url)?;
        Ok(self)
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings, Error> {
        let sendgrid_api_key = required(self.sendgrid_api_key, "SENDGRID_API_KEY")?;
        let sendgrid_sender_address =
            address(self.sendgrid_sender_address, "SENDGRID_SENDER_ADDRESS")?;
        let recipient_address = address(self.recipient_address, "RECIPIENT_ADDRESS")?;

        let sendgrid_api_url =
            parse_base_url(self.sendgrid_api_url.as_deref().unwrap_or(DEFAULT_API_URL))?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if request_timeout == 0 {
            return Err(Error::Config("REQUEST_TIMEOUT must be positive".to_string()));
        }

        Ok(Settings {
            sendgrid_api_key,
            sendgrid_sender_address,
            recipient_address,
            sendgrid_api_url,
            request_timeout,
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String, Error> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Config(format!("{} is not set", key))),
    }
}

fn address(value: Option<String>, key: &str) -> Result<String, Error> {
    let value = required(value, key)?;

    // Anything more thorough is left to the delivery API
    if !value.contains('@') {
        return Err(Error::Config(format!(
            "{} is not an email address: {}",
            key, value
        )));
    }

    Ok(value)
}

/// `Url::join` drops the last path segment unless the base ends with a slash
fn parse_base_url(raw: &str) -> Result<url::Url, Error> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }

    let url = url::Url::parse(&raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Config(format!(
            "SENDGRID_API_URL must be http or https, got {}",
            scheme
        ))),
    }
}

/// Loads pixmail settings from an optional TOML file, a `.env` file in the
/// working directory, and the process environment (in increasing order of
/// precedence).
///
/// Keys are the upper-case variable names (`SENDGRID_API_KEY`, ...), or the
/// same names in lower case inside the TOML file.
pub fn load_settings(path: Option<&str>) -> Result<Settings, Error> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    load_settings_from(path, None)
}

/// Same as [`load_settings`], but with an explicit environment map instead
/// of the process environment. `None` reads the process environment.
pub fn load_settings_from(
    path: Option<&str>,
    env: Option<HashMap<String, String>>,
) -> Result<Settings, Error> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path.unwrap_or(DEFAULT_PATH)).required(path.is_some()))
        .add_source(config::Environment::default().source(env))
        .build()?;

    let raw: RawSettings = settings.try_deserialize()?;

    raw.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SENDGRID_API_KEY", "SG.test"),
            ("SENDGRID_SENDER_ADDRESS", "me@example.com"),
            ("RECIPIENT_ADDRESS", "frame@pix-star.com"),
        ]
    }

    #[test]
    fn load_from_env() {
        let settings = load_settings_from(None, env(&full_env())).unwrap();

        assert_eq!(settings.sendgrid_api_key, "SG.test");
        assert_eq!(settings.sendgrid_sender_address, "me@example.com");
        assert_eq!(settings.recipient_address, "frame@pix-star.com");
        assert_eq!(settings.sendgrid_api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = load_settings_from(
            None,
            env(&[
                ("SENDGRID_API_KEY", "SG.test"),
                ("RECIPIENT_ADDRESS", "frame@pix-star.com"),
            ]),
        )
        .unwrap_err();

        match err {
            Error::Config(msg) => assert!(msg.contains("SENDGRID_SENDER_ADDRESS")),
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn empty_value_is_missing() {
        let mut vars = full_env();
        vars[0] = ("SENDGRID_API_KEY", "  ");

        let err = load_settings_from(None, env(&vars)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn bad_address() {
        let err = Settings::new("SG.test", "me@example.com", "not-an-address").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
sendgrid_api_key = "SG.file"
sendgrid_sender_address = "file@example.com"
recipient_address = "frame@pix-star.com"
sendgrid_api_url = "http://localhost:1234/v3"
request_timeout = 5
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let settings =
            load_settings_from(Some(path), env(&[("SENDGRID_API_KEY", "SG.env")])).unwrap();

        assert_eq!(settings.sendgrid_api_key, "SG.env");
        assert_eq!(settings.sendgrid_sender_address, "file@example.com");
        assert_eq!(settings.sendgrid_api_url.as_str(), "http://localhost:1234/v3/");
        assert_eq!(settings.request_timeout, 5);
    }

    #[test]
    fn explicit_file_must_exist() {
        let err = load_settings_from(Some("/nonexistent/pixmail.toml"), env(&full_env()));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn api_url_must_be_http() {
        let settings = Settings::new("SG.test", "me@example.com", "frame@pix-star.com").unwrap();

        let err = settings.clone().with_api_url("mailto:someone").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut vars = full_env();
        vars.push(("SENDGRID_API_URL", "ftp://api.sendgrid.com/v3"));
        assert!(matches!(
            load_settings_from(None, env(&vars)),
            Err(Error::Config(_))
        ));

        assert!(settings.with_api_url("http://localhost:8080/v3").is_ok());
    }

    #[test]
    fn timeout_from_env_string() {
        let mut vars = full_env();
        vars.push(("REQUEST_TIMEOUT", "15"));

        let settings = load_settings_from(None, env(&vars)).unwrap();
        assert_eq!(settings.request_timeout, 15);
    }
}
