use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::{PlayerData, PlayerPage};
use crate::describe::{fallback_description, DescriptionGenerator};
use crate::error::{Result, RosterError};
use crate::providers::PlayerSource;
use crate::store::PlayerStore;

/// Main roster orchestrator
///
/// Owns the persistence backend, the external player source, and the
/// description backend behind their traits; all three are injected at
/// construction so tests can substitute fakes.
pub struct RosterEngine {
    store: Arc<dyn PlayerStore>,
    source: Arc<dyn PlayerSource>,
    describer: Arc<dyn DescriptionGenerator>,
}

impl RosterEngine {
    /// Create a new engine from its collaborators
    pub fn new(
        store: Arc<dyn PlayerStore>,
        source: Arc<dyn PlayerSource>,
        describer: Arc<dyn DescriptionGenerator>,
    ) -> Self {
        Self {
            store,
            source,
            describer,
        }
    }

    /// Fetch one page of the listing, populating the store first if it is empty.
    ///
    /// The populate sweep runs at most once per process in practice: it only
    /// triggers while the store has zero records. A source or store failure
    /// during the sweep fails this request.
    pub async fn players_page(&self, page: u32, page_size: u32) -> Result<PlayerPage> {
        if self.store.count().await? == 0 {
            info!("No players in database. Fetching and populating...");
            let players = self.source.fetch_players().await?;
            let inserted = self.store.store_players(&players).await?;
            info!(
                "Populate sweep stored {} of {} players from '{}'",
                inserted,
                players.len(),
                self.source.name()
            );
        }

        self.store.fetch_page(page, page_size).await
    }

    /// Replace a player's raw payload wholesale.
    ///
    /// The typed statistic columns are deliberately not refreshed; the stored
    /// payload is authoritative for reads.
    pub async fn update_player(&self, id: i64, data: PlayerData) -> Result<()> {
        if self.store.update_data(id, &data).await? {
            info!("Player ID {} updated successfully", id);
            Ok(())
        } else {
            warn!("Update requested for unknown player ID {}", id);
            Err(RosterError::NotFound(id))
        }
    }

    /// Generate a short description, persist it into the player's payload,
    /// and return it.
    ///
    /// An unknown id fails before the generation backend is ever called.
    /// Generation failures degrade to a canned fallback sentence; only a
    /// failed persist is surfaced as an error.
    pub async fn describe_player(&self, id: i64) -> Result<String> {
        let player = match self.store.get_by_id(id).await? {
            Some(player) => player,
            None => {
                warn!("Description requested for unknown player ID {}", id);
                return Err(RosterError::NotFound(id));
            }
        };

        let mut data = player.data;
        let team = data
            .get("team")
            .and_then(Value::as_str)
            .map(str::to_string);

        let description = match self
            .describer
            .generate(&player.player_name, &player.position, team.as_deref())
            .await
        {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!("Empty description generated for player ID {}", id);
                fallback_description(&player.position, team.as_deref())
            }
            Err(e) => {
                error!("Description generation error: {}", e);
                fallback_description(&player.position, team.as_deref())
            }
        };

        data.insert(
            "description".to_string(),
            Value::String(description.clone()),
        );
        if !self.store.update_data(id, &data).await? {
            return Err(RosterError::Other(format!(
                "Failed to update player {} with description",
                id
            )));
        }

        Ok(description)
    }
}
