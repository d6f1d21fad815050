pub mod ollama;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::error::Result;

pub use ollama::OllamaClient;

/// Generated descriptions are truncated to this many characters.
pub const MAX_DESCRIPTION_CHARS: usize = 280;

/// Trait for player description backends
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    /// Generate a short description for a player.
    ///
    /// An error or an empty result is recovered by the caller with a
    /// [`fallback_description`]; it is never surfaced to the client.
    async fn generate(&self, player_name: &str, position: &str, team: Option<&str>)
        -> Result<String>;
}

/// Pick one of the fixed fallback sentences pseudo-randomly.
pub fn fallback_description(position: &str, team: Option<&str>) -> String {
    let team = team.unwrap_or("their team");
    let candidates = [
        format!("A talented {position} with a passion for the game."),
        format!("Bringing skill and determination to {team}."),
        "A rising star in baseball, known for precision and teamwork.".to_string(),
    ];
    candidates
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| candidates[0].clone())
}

/// Truncate to a character budget without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
