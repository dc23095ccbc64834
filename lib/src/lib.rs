//! Email every file in a directory as an attachment through SendGrid.

pub mod config;
pub mod email;
pub mod error;
pub mod files;
pub mod mailer;
pub mod sendgrid;
pub mod upload;

pub use error::Error;
pub use mailer::Mailer;
pub use upload::{run, send_all, send_message, Outcome, RunOptions, Summary};
