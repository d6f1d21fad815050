pub mod sqlite;

use async_trait::async_trait;

use crate::core::{PlayerData, PlayerPage};
use crate::error::Result;

pub use sqlite::SqliteStore;

/// A player row as read back from the store.
#[derive(Debug, Clone)]
pub struct StoredPlayer {
    pub player_name: String,
    pub position: String,
    /// The raw payload stored at ingest or by the last update
    pub data: PlayerData,
}

/// Trait for player persistence backends
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Total number of stored players
    async fn count(&self) -> Result<u64>;

    /// Fetch a single player by id, `None` if absent. No side effects.
    async fn get_by_id(&self, id: i64) -> Result<Option<StoredPlayer>>;

    /// Bulk-insert raw player records, one transaction per row.
    ///
    /// Returns the number of rows actually inserted. Rows committed before a
    /// failing row stay committed; the first error aborts the remainder.
    async fn store_players(&self, players: &[PlayerData]) -> Result<usize>;

    /// Fetch one 1-based page of players plus pagination totals.
    ///
    /// A page past the end yields an empty list with truthful totals.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PlayerPage>;

    /// Overwrite the raw payload for one player.
    ///
    /// The typed statistic columns are left untouched. Returns `true` iff
    /// exactly one row matched; `false` is the not-found case, not an error.
    async fn update_data(&self, id: i64, data: &PlayerData) -> Result<bool>;
}
