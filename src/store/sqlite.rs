use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::core::page::total_pages;
use crate::core::player::{self, PlayerData};
use crate::core::PlayerPage;
use crate::error::Result;
use crate::store::{PlayerStore, StoredPlayer};

/// SQLite-based player store
///
/// Schema:
/// ```sql
/// CREATE TABLE players (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     player_name TEXT,
///     position TEXT,
///     games INTEGER, at_bat INTEGER, runs INTEGER, hits INTEGER,
///     double_2b INTEGER, third_baseman INTEGER, home_run INTEGER,
///     run_batted_in INTEGER, a_walk INTEGER, strikeouts INTEGER,
///     stolen_base INTEGER, caught_stealing INTEGER,
///     avg REAL, on_base_percentage REAL,
///     slugging_percentage REAL, on_base_plus_slugging REAL,
///     data TEXT,
///     UNIQUE(player_name, position)
/// );
/// ```
///
/// The typed statistic columns are written once at ingest and never refreshed
/// by `update_data` — the `data` payload is authoritative for reads and the
/// typed columns are a queryable secondary index that goes stale on update.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database and ensure the players table exists.
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                player_name TEXT,
                position TEXT,
                games INTEGER,
                at_bat INTEGER,
                runs INTEGER,
                hits INTEGER,
                double_2b INTEGER,
                third_baseman INTEGER,
                home_run INTEGER,
                run_batted_in INTEGER,
                a_walk INTEGER,
                strikeouts INTEGER,
                stolen_base INTEGER,
                caught_stealing INTEGER,
                avg REAL,
                on_base_percentage REAL,
                slugging_percentage REAL,
                on_base_plus_slugging REAL,
                data TEXT,
                UNIQUE(player_name, position)
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Parse a stored `data` payload, absorbing corruption as an empty map.
    fn parse_data(raw: &str) -> PlayerData {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!("Stored player payload is not a JSON object, treating as empty");
                PlayerData::new()
            }
        }
    }
}

#[async_trait]
impl PlayerStore for SqliteStore {
    async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let total: u64 = conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
        Ok(total)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredPlayer>> {
        let conn = self.conn.lock().unwrap();

        let result = conn
            .query_row(
                "SELECT player_name, position, data FROM players WHERE id = ?1",
                params![id],
                |row| {
                    let player_name: String = row.get(0)?;
                    let position: String = row.get(1)?;
                    let data_json: String = row.get(2)?;
                    Ok((player_name, position, data_json))
                },
            )
            .optional()?;

        Ok(result.map(|(player_name, position, data_json)| StoredPlayer {
            player_name,
            position,
            data: Self::parse_data(&data_json),
        }))
    }

    async fn store_players(&self, players: &[PlayerData]) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        info!("Attempting to store {} players", players.len());

        let mut inserted = 0usize;
        for record in players {
            let player_name = player::player_name(record);
            let position = player::position(record);
            let data_json = serde_json::to_string(record)?;

            // Each execute auto-commits: rows stored before a failure stay
            // stored. A duplicate (player_name, position) is ignored rather
            // than inserted twice, and does not count as inserted.
            let changed = conn
                .execute(
                    "INSERT OR IGNORE INTO players (
                        player_name, position,
                        games, at_bat, runs, hits,
                        double_2b, third_baseman, home_run,
                        run_batted_in, a_walk, strikeouts,
                        stolen_base, caught_stealing,
                        avg, on_base_percentage,
                        slugging_percentage, on_base_plus_slugging,
                        data
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                    params![
                        player_name,
                        position,
                        player::stat_i64(record, &["games"]),
                        player::stat_i64(record, &["at-bat", "at_bat"]),
                        player::stat_i64(record, &["runs"]),
                        player::stat_i64(record, &["hits"]),
                        player::stat_i64(record, &["double_(2b)"]),
                        player::stat_i64(record, &["third_baseman"]),
                        player::stat_i64(record, &["home_run"]),
                        player::stat_i64(record, &["run_batted_in"]),
                        player::stat_i64(record, &["a_walk"]),
                        player::stat_i64(record, &["strikeouts"]),
                        player::stat_i64(record, &["stolen_base"]),
                        player::stat_i64(record, &["caught_stealing"]),
                        player::stat_f64(record, &["avg"]),
                        player::stat_f64(record, &["on-base_percentage", "on_base_percentage"]),
                        player::stat_f64(record, &["slugging_percentage"]),
                        player::stat_f64(record, &["on-base_plus_slugging", "on_base_plus_slugging"]),
                        data_json,
                    ],
                )
                .map_err(|e| {
                    tracing::error!(
                        "Database error after {} rows committed ({} '{}'): {}",
                        inserted,
                        position,
                        player_name,
                        e
                    );
                    e
                })?;

            if changed > 0 {
                inserted += 1;
                debug!("Stored player '{}' ({})", player_name, position);
            } else {
                debug!("Skipped duplicate player '{}' ({})", player_name, position);
            }
        }

        info!("Stored {} of {} players", inserted, players.len());
        Ok(inserted)
    }

    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PlayerPage> {
        let conn = self.conn.lock().unwrap();

        let total_players: u64 =
            conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let mut stmt = conn.prepare(
            "SELECT id, player_name, position, data FROM players ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![i64::from(page_size), offset], |row| {
            let id: i64 = row.get(0)?;
            let player_name: String = row.get(1)?;
            let position: String = row.get(2)?;
            let data_json: String = row.get(3)?;
            Ok((id, player_name, position, data_json))
        })?;

        let mut players = Vec::new();
        for row in rows {
            let (id, player_name, position, data_json) = row?;
            // The payload is authoritative for everything except the typed
            // identity columns, which win on key collision.
            let mut merged = Self::parse_data(&data_json);
            merged.insert("id".to_string(), json!(id));
            merged.insert("player_name".to_string(), json!(player_name));
            merged.insert("position".to_string(), json!(position));
            players.push(Value::Object(merged));
        }

        let total_pages = total_pages(total_players, page_size);
        debug!(
            "Pagination details - Total Players: {}, Total Pages: {}",
            total_players, total_pages
        );

        Ok(PlayerPage {
            players,
            total_players,
            total_pages,
            current_page: page,
            page_size,
        })
    }

    async fn update_data(&self, id: i64, data: &PlayerData) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let data_json = serde_json::to_string(data)?;
        let changed = conn.execute(
            "UPDATE players SET data = ?1 WHERE id = ?2",
            params![data_json, id],
        )?;

        Ok(changed > 0)
    }
}
