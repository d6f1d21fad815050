use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of the player listing plus pagination totals.
///
/// Each element of `players` is the stored raw payload merged with the typed
/// identity columns (`id`, `player_name`, `position`), typed columns winning
/// on key collision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPage {
    pub players: Vec<Value>,

    /// Total records in the store, regardless of page
    pub total_players: u64,

    /// `ceil(total_players / page_size)`
    pub total_pages: u64,

    pub current_page: u32,

    pub page_size: u32,
}

impl PlayerPage {
    /// An empty page with truthful totals.
    pub fn empty(current_page: u32, page_size: u32) -> Self {
        Self {
            players: Vec::new(),
            total_players: 0,
            total_pages: 0,
            current_page,
            page_size,
        }
    }
}

/// Total page count for `total` records at `page_size` records per page.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    let page_size = u64::from(page_size.max(1));
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn test_empty_page_keeps_request_params() {
        let page = PlayerPage::empty(7, 25);
        assert!(page.players.is_empty());
        assert_eq!(page.current_page, 7);
        assert_eq!(page.page_size, 25);
        assert_eq!(page.total_players, 0);
    }
}
