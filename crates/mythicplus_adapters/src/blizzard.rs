//! Battle.net client: client-credentials token cache and mythic keystone ratings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mythicplus_core::clock::Clock;
use mythicplus_core::config::Region;
use mythicplus_core::entities::KeystoneProfile;
use mythicplus_core::ports::RatingProvider;
use mythicplus_core::Error;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const OAUTH_TOKEN_URL: &str = "https://oauth.battle.net/token";

/// A token is refreshed once it is this close to expiring
const EXPIRY_BUFFER_SECS: i64 = 5 * 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct BearerToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Client-credentials bearer token, refreshed ahead of expiry.
///
/// The lock is held across check-and-refresh so concurrent callers wait for
/// one refresh instead of racing their own.
pub struct CredentialCache {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<BearerToken>>,
}

impl CredentialCache {
    pub fn new(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            token_url: OAUTH_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            clock,
            token: Mutex::new(None),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Return a bearer token that is valid for at least five more minutes,
    /// requesting a new one if needed. A failed refresh leaves the previous
    /// token in place.
    pub async fn ensure_valid(&self) -> Result<String, Error> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(Error::NotConfigured(
                "Battle.net client id and secret must be set".to_string(),
            ));
        }

        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if !self.is_stale(current) {
                return Ok(current.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    fn is_stale(&self, token: &BearerToken) -> bool {
        token.access_token.is_empty()
            || self.clock.now() + Duration::seconds(EXPIRY_BUFFER_SECS) >= token.expires_at
    }

    async fn request_token(&self) -> Result<BearerToken, Error> {
        debug!("requesting bearer token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| Error::CredentialRefresh(format!("token request failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            return Err(Error::CredentialRefresh(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            Error::CredentialRefresh(format!("failed to read token response: {}", e))
        })?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            Error::CredentialRefresh(format!("failed to parse token response: {}", e))
        })?;

        let expires_at = self.clock.now() + Duration::seconds(parsed.expires_in);
        debug!(%expires_at, "bearer token acquired");

        Ok(BearerToken {
            access_token: parsed.access_token,
            expires_at,
        })
    }

    #[cfg(test)]
    async fn cached_token(&self) -> Option<String> {
        self.token
            .lock()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }
}

/// Battle.net profile API client (authoritative overall rating)
pub struct BlizzardClient {
    client: Client,
    api_base_url: String,
    region: Region,
    credentials: CredentialCache,
}

impl BlizzardClient {
    pub fn new(client: Client, region: Region, credentials: CredentialCache) -> Self {
        Self {
            client,
            api_base_url: format!("https://{}.api.blizzard.com", region),
            region,
            credentials,
        }
    }

    pub fn with_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }
}

#[async_trait]
impl RatingProvider for BlizzardClient {
    #[instrument(skip(self))]
    async fn fetch_rating(&self, realm: &str, name: &str) -> Result<KeystoneProfile, Error> {
        let bearer = self.credentials.ensure_valid().await?;

        let realm = realm.to_lowercase();
        let name = name.to_lowercase();
        let url = format!(
            "{}/profile/wow/character/{}/{}/mythic-keystone-profile",
            self.api_base_url, realm, name
        );
        let namespace = format!("profile-{}", self.region);

        debug!(url = %url, "fetching mythic keystone profile");

        let response = self
            .client
            .get(&url)
            .query(&[("namespace", namespace.as_str()), ("locale", "en_US")])
            .bearer_auth(&bearer)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Battle.net request failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            return Err(Error::Provider {
                provider: "blizzard",
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read Battle.net response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::Decode(format!("mythic keystone profile: {}", e)))
    }
}
