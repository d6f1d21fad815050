use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::core::player::{normalize_keys, PlayerData};
use crate::error::{Result, RosterError};
use crate::providers::PlayerSource;

/// Default endpoint serving the historical batting records
pub const DEFAULT_SOURCE_URL: &str = "https://api.hirefraction.com/api/test/baseball";

/// Unauthenticated JSON source for the one-time populate sweep.
///
/// The endpoint returns a single array of loosely-typed records with
/// inconsistent key casing and spacing; keys are normalized to snake_case
/// before the records are handed to the store.
pub struct BaseballApiSource {
    client: Client,
    url: String,
}

impl BaseballApiSource {
    /// Create a new source client for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: url.into(),
        }
    }
}

impl Default for BaseballApiSource {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_URL)
    }
}

#[async_trait]
impl PlayerSource for BaseballApiSource {
    async fn fetch_players(&self) -> Result<Vec<PlayerData>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RosterError::Source {
                name: self.name().to_string(),
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(RosterError::Source {
                name: self.name().to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        // The API returns a bare array, not a wrapped object
        let players: Vec<PlayerData> =
            response.json().await.map_err(|e| RosterError::Source {
                name: self.name().to_string(),
                message: format!("Invalid JSON: {}", e),
            })?;

        Ok(players.iter().map(normalize_keys).collect())
    }

    fn name(&self) -> &str {
        "baseball-api"
    }
}
