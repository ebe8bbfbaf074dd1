use async_trait::async_trait;
use drive_core::{BoxError, SessionStore};
use redis::{AsyncCommands, RedisResult};
use tracing::debug;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

fn pending_key(hold_id: &str) -> String {
    format!("pending:{}", hold_id)
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn set_pending(&self, hold_id: &str, payload: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(pending_key(hold_id), payload, ttl_seconds).await?;
        debug!("Pending reservation stored for hold {}", hold_id);
        Ok(())
    }

    async fn get_pending(&self, hold_id: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(pending_key(hold_id)).await
    }

    async fn del_pending(&self, hold_id: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(pending_key(hold_id)).await
    }

    async fn incr_window(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = window_pipeline(key, window_seconds).query_async(&mut conn).await?;

        Ok(count <= limit)
    }
}

/// `INCR` plus an `EXPIRE ... NX` that only sets the TTL when the key has
/// none, so the window starts at the first hit and is never extended.
fn window_pipeline(key: &str, window_seconds: i64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window_seconds)
        .arg("NX")
        .ignore();
    pipe
}

#[async_trait]
impl SessionStore for RedisClient {
    async fn save_pending(&self, hold_id: &str, payload: &str, ttl_seconds: u64) -> Result<(), BoxError> {
        Ok(self.set_pending(hold_id, payload, ttl_seconds).await?)
    }

    async fn load_pending(&self, hold_id: &str) -> Result<Option<String>, BoxError> {
        Ok(self.get_pending(hold_id).await?)
    }

    async fn discard_pending(&self, hold_id: &str) -> Result<(), BoxError> {
        Ok(self.del_pending(hold_id).await?)
    }

    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, BoxError> {
        Ok(self.incr_window(key, limit, window_seconds).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_expiry_is_set_once() {
        let packed = String::from_utf8(window_pipeline("ratelimit:1.2.3.4", 60).get_packed_pipeline()).unwrap();

        assert!(packed.contains("INCR"));
        assert!(packed.contains("EXPIRE\r\n$17\r\nratelimit:1.2.3.4\r\n$2\r\n60\r\n$2\r\nNX"));
    }
}
