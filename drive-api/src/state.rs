use std::sync::Arc;
use std::time::Duration as StdDuration;
use chrono::Duration;
use drive_catalog::Car;
use drive_core::{Clock, SessionStore, Upstream};
use drive_reservation::HoldLedger;
use drive_shared::Masked;
use drive_shared::models::events::ReservationNotice;
use drive_store::app_config::BusinessRules;
use drive_store::CatalogCache;
use tokio::sync::{broadcast, Mutex};

#[derive(Clone)]
pub struct AuthConfig {
    pub hold_token_secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub sessions: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
    pub holds: Arc<Mutex<HoldLedger>>,
    pub catalog: CatalogCache,
    pub sse_tx: broadcast::Sender<ReservationNotice>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

impl AppState {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        auth: AuthConfig,
        business_rules: BusinessRules,
    ) -> Self {
        let window = Duration::seconds(business_rules.soft_hold_seconds as i64);
        let (sse_tx, _) = broadcast::channel(100);

        Self {
            upstream,
            sessions,
            clock,
            holds: Arc::new(Mutex::new(HoldLedger::new(window))),
            catalog: CatalogCache::new(StdDuration::from_secs(business_rules.catalog_cache_seconds)),
            sse_tx,
            auth,
            business_rules,
        }
    }

    /// Publishes a notice to SSE subscribers. Having none is not an error.
    pub fn publish(&self, notice: ReservationNotice) {
        match notice.recipient.as_deref() {
            Some(to) => tracing::info!("Notice {:?} for {} to {}", notice.kind, notice.reservation_ref, Masked(to)),
            None => tracing::info!("Notice {:?} for {}", notice.kind, notice.reservation_ref),
        }
        let _ = self.sse_tx.send(notice);
    }

    /// Car details from the catalog cache, without touching the backend.
    pub async fn cached_car(&self, car_id: &str) -> Option<Car> {
        self.catalog
            .cars()
            .await
            .and_then(|cars| cars.into_iter().find(|c| c.id == car_id))
    }
}
