//! In-memory patient data keyed by session id.
//!
//! Payloads are stored as given. Nothing here encrypts: callers that need
//! confidentiality run payloads through `SecurityHelper::encrypt_data` first.
//! Records are never reclaimed implicitly; call `sweep_stale` on a schedule.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PatientConfig;

#[derive(Debug, Clone)]
struct PatientRecord {
    payload: Value,
    stored_at: DateTime<Utc>,
}

/// Session-scoped patient payloads.
pub struct PatientDataStore {
    config: PatientConfig,
    records: RwLock<HashMap<String, PatientRecord>>,
}

impl PatientDataStore {
    pub fn new(config: PatientConfig) -> Self {
        Self {
            config,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the payload for `session_id`.
    ///
    /// When the store is full and `session_id` is new, the oldest record is
    /// evicted to make room.
    pub fn store_patient_data(&self, session_id: &str, payload: Value) {
        let mut records = self.records.write();
        if !records.contains_key(session_id) && records.len() >= self.config.max_records.max(1) {
            let oldest = records
                .iter()
                .min_by_key(|(_, record)| record.stored_at)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                records.remove(&oldest);
                warn!(
                    capacity = self.config.max_records,
                    "patient store full, evicted oldest record"
                );
            }
        }
        records.insert(
            session_id.to_string(),
            PatientRecord {
                payload,
                stored_at: Utc::now(),
            },
        );
    }

    pub fn get_patient_data(&self, session_id: &str) -> Option<Value> {
        self.records
            .read()
            .get(session_id)
            .map(|record| record.payload.clone())
    }

    /// Remove the payload for `session_id`. No-op if absent.
    pub fn clear_patient_data(&self, session_id: &str) {
        if self.records.write().remove(session_id).is_some() {
            debug!("patient data cleared");
        }
    }

    /// Drop every record stored more than `max_age` ago. Returns the count removed.
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        self.sweep_stale_at(max_age, Utc::now())
    }

    pub fn sweep_stale_at(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - max_age;
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| record.stored_at >= cutoff);
        let removed = before - records.len();
        if removed > 0 {
            debug!(removed, "stale patient records swept");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for PatientDataStore {
    fn default() -> Self {
        Self::new(PatientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_get_and_clear() {
        let store = PatientDataStore::default();
        store.store_patient_data("s1", json!({"allergies": ["penicillin"]}));
        assert_eq!(
            store.get_patient_data("s1"),
            Some(json!({"allergies": ["penicillin"]}))
        );
        assert_eq!(store.get_patient_data("s2"), None);

        store.clear_patient_data("s1");
        store.clear_patient_data("s1");
        assert!(store.is_empty());
    }

    #[test]
    fn storing_again_replaces_payload() {
        let store = PatientDataStore::default();
        store.store_patient_data("s1", json!(1));
        store.store_patient_data("s1", json!("two"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_patient_data("s1"), Some(json!("two")));
    }

    #[test]
    fn full_store_evicts_oldest() {
        let store = PatientDataStore::new(PatientConfig { max_records: 2 });
        store.store_patient_data("a", json!(null));
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.store_patient_data("b", json!(null));
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.store_patient_data("c", json!(null));

        assert_eq!(store.len(), 2);
        assert!(store.get_patient_data("a").is_none());
        assert!(store.get_patient_data("c").is_some());
    }

    #[test]
    fn sweep_removes_only_stale_records() {
        let store = PatientDataStore::default();
        store.store_patient_data("old", json!(0));
        let later = Utc::now() + Duration::minutes(30);
        assert_eq!(store.sweep_stale_at(Duration::hours(1), later), 0);
        assert_eq!(store.sweep_stale_at(Duration::minutes(10), later), 1);
        assert!(store.is_empty());
    }
}
