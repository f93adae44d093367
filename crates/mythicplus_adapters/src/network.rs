//! Shared HTTP client configuration for provider and notification calls.

use std::time::Duration;

use mythicplus_core::Error;
use reqwest::Client;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_AGENT: &str = concat!("mythicplus/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the Battle.net, Raider.IO and Discord adapters.
///
/// This client is configured with:
/// - A fixed user agent
/// - Request and connect timeouts
pub fn build_api_client() -> Result<Client, Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .build()
        .map_err(|e| Error::Network(format!("failed to create HTTP client: {}", e)))
}
