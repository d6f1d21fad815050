use serde_json::Value;

/// Raw player record as received from the external source or an update body.
///
/// The full payload is stored verbatim in the `data` column and is the source
/// of truth when records are reconstructed for output; the typed statistic
/// columns are a denormalized index derived from it at insert time.
pub type PlayerData = serde_json::Map<String, Value>;

/// Default for a missing or empty name/position
pub const UNKNOWN: &str = "Unknown";

/// Normalize record keys to snake_case: lowercase, spaces replaced with underscores.
///
/// The external source returns inconsistent key casing and spacing
/// (`"Player name"`, `"At-bat"`), so every key is normalized before any lookup.
pub fn normalize_keys(record: &PlayerData) -> PlayerData {
    record
        .iter()
        .map(|(k, v)| (k.to_lowercase().replace(' ', "_"), v.clone()))
        .collect()
}

/// Derive the player name, falling back across known spellings and then to `"Unknown"`.
pub fn player_name(record: &PlayerData) -> String {
    non_empty_str(record, &["player_name", "name"])
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Derive the position, defaulting to `"Unknown"` when absent or empty.
pub fn position(record: &PlayerData) -> String {
    non_empty_str(record, &["position"])
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Best-effort integer coercion across alternate key spellings.
///
/// Accepts a JSON number (fractional values truncate) or a string holding an
/// integer. Anything else — `"N/A"`, `null`, a missing key — yields `None`
/// for this field only; a bad value never fails the record.
pub fn stat_i64(record: &PlayerData, keys: &[&str]) -> Option<i64> {
    match first_present(record, keys)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Best-effort float coercion across alternate key spellings.
pub fn stat_f64(record: &PlayerData, keys: &[&str]) -> Option<f64> {
    match first_present(record, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn first_present<'a>(record: &'a PlayerData, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| record.get(*k).filter(|v| !v.is_null()))
}

fn non_empty_str<'a>(record: &'a PlayerData, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| record.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PlayerData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_normalize_keys() {
        let raw = record(json!({"Player name": "Babe Ruth", "At-bat": "365", "AVG": 0.342}));
        let normalized = normalize_keys(&raw);
        assert!(normalized.contains_key("player_name"));
        assert!(normalized.contains_key("at-bat"));
        assert!(normalized.contains_key("avg"));
    }

    #[test]
    fn test_name_fallback_chain() {
        let with_name = record(json!({"name": "Hank Aaron"}));
        assert_eq!(player_name(&with_name), "Hank Aaron");

        let preferred = record(json!({"player_name": "Hank Aaron", "name": "ignored"}));
        assert_eq!(player_name(&preferred), "Hank Aaron");

        let empty = record(json!({"player_name": ""}));
        assert_eq!(player_name(&empty), UNKNOWN);

        let missing = record(json!({}));
        assert_eq!(player_name(&missing), UNKNOWN);
        assert_eq!(position(&missing), UNKNOWN);
    }

    #[test]
    fn test_stat_i64_coercion() {
        let r = record(json!({
            "games": 152,
            "hits": "189",
            "runs": "N/A",
            "at-bat": 365.7,
            "strikeouts": null
        }));
        assert_eq!(stat_i64(&r, &["games"]), Some(152));
        assert_eq!(stat_i64(&r, &["hits"]), Some(189));
        assert_eq!(stat_i64(&r, &["runs"]), None);
        assert_eq!(stat_i64(&r, &["at-bat", "at_bat"]), Some(365));
        assert_eq!(stat_i64(&r, &["strikeouts"]), None);
        assert_eq!(stat_i64(&r, &["missing"]), None);
    }

    #[test]
    fn test_stat_i64_rejects_fractional_strings() {
        // int("0.319") raises in the ingest pipeline's terms: a fractional
        // string is not a valid integer stat and coerces to absent.
        let r = record(json!({"hits": "0.319"}));
        assert_eq!(stat_i64(&r, &["hits"]), None);
    }

    #[test]
    fn test_stat_f64_coercion() {
        let r = record(json!({"avg": 0.328, "on-base_percentage": "0.410", "slugging_percentage": "N/A"}));
        assert_eq!(stat_f64(&r, &["avg"]), Some(0.328));
        assert_eq!(
            stat_f64(&r, &["on-base_percentage", "on_base_percentage"]),
            Some(0.410)
        );
        assert_eq!(stat_f64(&r, &["slugging_percentage"]), None);
    }

    #[test]
    fn test_alternate_spelling_fallback() {
        let r = record(json!({"at_bat": 512}));
        assert_eq!(stat_i64(&r, &["at-bat", "at_bat"]), Some(512));
    }
}
