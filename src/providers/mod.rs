pub mod baseball;

use async_trait::async_trait;

use crate::core::PlayerData;
use crate::error::Result;

pub use baseball::BaseballApiSource;

/// Trait for external player-data sources
#[async_trait]
pub trait PlayerSource: Send + Sync {
    /// Fetch the full set of raw player records, keys already normalized
    async fn fetch_players(&self) -> Result<Vec<PlayerData>>;

    /// Get source name
    fn name(&self) -> &str;
}
