//! # Roster Engine
//!
//! Baseball roster backend with:
//! - SQLite persistence with a denormalized JSON payload per player
//! - One-time populate sweep from an external player source
//! - TTL + LRU response caching for the paginated listing endpoint
//! - LLM-generated player descriptions with canned fallbacks
//! - Async/await architecture
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster_engine::{
//!     BaseballApiSource, OllamaClient, RosterEngine, SqliteStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteStore::new("roster.db").await?);
//!     let engine = RosterEngine::new(
//!         store,
//!         Arc::new(BaseballApiSource::default()),
//!         Arc::new(OllamaClient::default()),
//!     );
//!
//!     let page = engine.players_page(1, 10).await?;
//!     println!("{} players, {} pages", page.total_players, page.total_pages);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod core;
pub mod describe;
pub mod engine;
pub mod error;
pub mod providers;
pub mod store;

// Re-export primary types
pub use cache::{ResponseCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
pub use core::{PlayerData, PlayerPage};
pub use describe::{DescriptionGenerator, OllamaClient};
pub use engine::RosterEngine;
pub use error::{Result, RosterError};
pub use providers::{BaseballApiSource, PlayerSource};
pub use store::{PlayerStore, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
