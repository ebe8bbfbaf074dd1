use async_trait::async_trait;
use drive_core::{BoxError, SessionStore};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Process-local session store, used when no Redis URL is configured and
/// in tests. State is lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    pending: Mutex<HashMap<String, (String, Instant)>>,
    counters: Mutex<HashMap<String, (i64, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> BoxError {
    "session store lock poisoned".into()
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_pending(&self, hold_id: &str, payload: &str, ttl_seconds: u64) -> Result<(), BoxError> {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        self.pending
            .lock()
            .map_err(poisoned)?
            .insert(hold_id.to_string(), (payload.to_string(), deadline));
        Ok(())
    }

    async fn load_pending(&self, hold_id: &str) -> Result<Option<String>, BoxError> {
        let mut pending = self.pending.lock().map_err(poisoned)?;
        match pending.get(hold_id) {
            Some((_, deadline)) if Instant::now() >= *deadline => {
                pending.remove(hold_id);
                Ok(None)
            }
            Some((payload, _)) => Ok(Some(payload.clone())),
            None => Ok(None),
        }
    }

    async fn discard_pending(&self, hold_id: &str) -> Result<(), BoxError> {
        self.pending.lock().map_err(poisoned)?.remove(hold_id);
        Ok(())
    }

    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, BoxError> {
        let now = Instant::now();
        let window = Duration::from_secs(window_seconds.max(0) as u64);
        let mut counters = self.counters.lock().map_err(poisoned)?;
        counters.retain(|_, (_, started)| now.duration_since(*started) < window);

        let entry = counters.entry(key.to_string()).or_insert((0, now));
        entry.0 += 1;

        Ok(entry.0 <= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_round_trip_and_discard() {
        let store = MemorySessionStore::new();
        store.save_pending("h1", "{\"car\":\"12\"}", 60).await.unwrap();
        assert_eq!(store.load_pending("h1").await.unwrap().as_deref(), Some("{\"car\":\"12\"}"));

        store.save_pending("h1", "{\"car\":\"13\"}", 60).await.unwrap();
        assert_eq!(store.load_pending("h1").await.unwrap().as_deref(), Some("{\"car\":\"13\"}"));

        store.discard_pending("h1").await.unwrap();
        assert!(store.load_pending("h1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_gone() {
        let store = MemorySessionStore::new();
        store.save_pending("h2", "{}", 0).await.unwrap();
        assert!(store.load_pending("h2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_window() {
        let store = MemorySessionStore::new();
        assert!(store.check_rate_limit("ip", 2, 60).await.unwrap());
        assert!(store.check_rate_limit("ip", 2, 60).await.unwrap());
        assert!(!store.check_rate_limit("ip", 2, 60).await.unwrap());
        assert!(store.check_rate_limit("other", 2, 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_finished_windows_are_dropped() {
        let store = MemorySessionStore::new();
        for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
            assert!(store.check_rate_limit(ip, 1, 0).await.unwrap());
        }
        assert_eq!(store.counters.lock().unwrap().len(), 1);

        assert!(store.check_rate_limit("10.0.0.3", 1, 0).await.unwrap());
    }
}
