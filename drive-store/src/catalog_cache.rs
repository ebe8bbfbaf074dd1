use drive_catalog::Car;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

/// Short-lived copy of the backend's car list.
///
/// The raw JSON is kept so the public listing can be relayed unchanged;
/// typed lookups parse it on demand. Any car mutation must call
/// [`CatalogCache::invalidate`].
#[derive(Clone)]
pub struct CatalogCache {
    ttl: Duration,
    entry: Arc<RwLock<Option<(Instant, Value)>>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn get(&self) -> Option<Value> {
        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some((stored_at, listing)) if stored_at.elapsed() < self.ttl => Some(listing.clone()),
            _ => None,
        }
    }

    pub async fn put(&self, listing: Value) {
        *self.entry.write().await = Some((Instant::now(), listing));
    }

    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }

    /// Typed view of the cached listing. Entries the car model cannot
    /// read are skipped.
    pub async fn cars(&self) -> Option<Vec<Car>> {
        self.get().await.map(|listing| parse_cars(&listing))
    }
}

pub fn parse_cars(listing: &Value) -> Vec<Car> {
    let items = match listing {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Car>(item.clone()) {
            Ok(car) => Some(car),
            Err(e) => {
                warn!("Skipping unreadable car entry: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let cache = CatalogCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());

        cache
            .put(json!([
                {"id": 1, "name": "Kia", "price_per_day": 500.0, "status": "available"},
                {"id": 2, "name": "Broken"}
            ]))
            .await;
        let cars = cache.cars().await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].id, "1");

        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = CatalogCache::new(Duration::ZERO);
        cache.put(json!([])).await;
        assert!(cache.get().await.is_none());
    }

    #[test]
    fn test_paginated_listing() {
        let cars = parse_cars(&json!({"results": [
            {"id": 3, "name": "Honda", "price_per_day": 700.0, "status": "reserved"}
        ]}));
        assert_eq!(cars.len(), 1);
    }
}
