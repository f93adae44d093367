use async_trait::async_trait;
use mythicplus_core::config::Region;
use mythicplus_core::entities::RaiderIoProfile;
use mythicplus_core::ports::ProfileProvider;
use mythicplus_core::Error;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

const BASE_URL: &str = "https://raider.io";

/// Profile fields requested on every lookup
const PROFILE_FIELDS: &str =
    "mythic_plus_scores_by_season:current,mythic_plus_ranks,mythic_plus_recent_runs";

/// Raider.IO character profile client.
///
/// docs: https://raider.io/api#/character/getApiV1CharactersProfile
pub struct RaiderIoClient {
    client: Client,
    base_url: String,
    access_key: String,
    region: Region,
}

impl RaiderIoClient {
    pub fn new(client: Client, access_key: impl Into<String>, region: Region) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            access_key: access_key.into(),
            region,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ProfileProvider for RaiderIoClient {
    #[instrument(skip(self))]
    async fn fetch_profile(&self, realm: &str, name: &str) -> Result<RaiderIoProfile, Error> {
        let url = format!("{}/api/v1/characters/profile", self.base_url);

        let mut query = vec![
            ("region", self.region.as_str()),
            ("realm", realm),
            ("name", name),
            ("fields", PROFILE_FIELDS),
        ];
        // Keyless access is allowed, just at a lower rate limit
        if !self.access_key.is_empty() {
            query.push(("access_key", self.access_key.as_str()));
        }

        debug!("fetching character from raider.io");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Raider.IO request failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            return Err(Error::Provider {
                provider: "raiderio",
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read Raider.IO response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| Error::Decode(format!("Raider.IO profile: {}", e)))
    }
}
