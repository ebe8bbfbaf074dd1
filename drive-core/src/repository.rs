use async_trait::async_trait;
use crate::BoxError;

/// Short-lived per-visitor state held by the gateway.
///
/// Values are opaque JSON strings; the reservation crate owns their shape.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save the pending-reservation snapshot for a hold, replacing any
    /// previous one. The entry disappears after `ttl_seconds`.
    async fn save_pending(
        &self,
        hold_id: &str,
        payload: &str,
        ttl_seconds: u64,
    ) -> Result<(), BoxError>;

    async fn load_pending(
        &self,
        hold_id: &str,
    ) -> Result<Option<String>, BoxError>;

    async fn discard_pending(
        &self,
        hold_id: &str,
    ) -> Result<(), BoxError>;

    /// Fixed-window counter; returns `false` once `limit` is exceeded
    /// inside the current window.
    async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> Result<bool, BoxError>;
}
