use anyhow::{Context, Result};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("seo-auditor/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// Follows redirects like a browser would.
    Standard,
    /// Returns 3xx responses as-is so the redirect target can be inspected.
    NoRedirect,
}

/// Factory for the HTTP clients used by site probes.
pub fn create_client(client_type: ClientType, timeout: Duration, user_agent: &str) -> Result<Client> {
    let builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent);

    match client_type {
        ClientType::Standard => builder
            .redirect(Policy::limited(10))
            .build()
            .context("Failed to build standard reqwest client"),
        ClientType::NoRedirect => builder
            .redirect(Policy::none())
            .build()
            .context("Failed to build non-redirecting reqwest client"),
    }
}
