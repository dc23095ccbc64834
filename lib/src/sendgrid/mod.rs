mod api;
mod client;

pub use api::{ApiError, ApiErrors};
pub use client::SendGridClient;
