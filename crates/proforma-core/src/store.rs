use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ProFormaResult;

/// Key-value persistence collaborator for saved runs. The engine only
/// writes; whatever sits behind the trait (browser storage, a file, a
/// database) is the caller's concern.
pub trait ResultStore {
    fn put(&mut self, key: &str, payload: &str) -> ProFormaResult<()>;
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory store for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

impl ResultStore for MemoryStore {
    fn put(&mut self, key: &str, payload: &str) -> ProFormaResult<()> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Serialize a computation payload and store it under
/// `<model_type>/<RFC3339 timestamp>`. Returns the key written.
pub fn save_results<S, T>(
    store: &mut S,
    model_type: &str,
    saved_at: DateTime<Utc>,
    payload: &T,
) -> ProFormaResult<String>
where
    S: ResultStore + ?Sized,
    T: Serialize,
{
    let key = format!("{model_type}/{}", saved_at.to_rfc3339());
    let json = serde_json::to_string(payload)?;
    store.put(&key, &json)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_save_and_read_back() {
        let mut store = MemoryStore::new();
        let saved_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let payload = serde_json::json!({"noi": "66000"});

        let key = save_results(&mut store, "multifamily", saved_at, &payload).unwrap();
        assert_eq!(key, "multifamily/2024-03-01T12:00:00+00:00");

        let stored = store.get(&key).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&stored).unwrap(),
            payload
        );
    }

    #[test]
    fn test_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("hotel/2024-01-01T00:00:00+00:00").is_none());
    }

    #[test]
    fn test_keys_sorted_by_model_then_time() {
        let mut store = MemoryStore::new();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        save_results(&mut store, "hotel", t2, &1u8).unwrap();
        save_results(&mut store, "hotel", t1, &2u8).unwrap();

        let keys: Vec<&str> = store.keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys[0] < keys[1]);
    }
}
