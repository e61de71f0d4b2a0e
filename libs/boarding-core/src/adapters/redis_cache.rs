use crate::{Cache, CoreError};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

// Keeps session keys apart from anything else living in a shared Redis
const KEY_NAMESPACE: &str = "boardingmate:";

fn remote(e: redis::RedisError) -> CoreError {
    CoreError::RemoteFailure(Box::new(e))
}

// Redis answers `SET .. EX 0` with an error; surface it as ours before the round trip
fn checked_ttl(ttl_seconds: u64) -> Result<u64, CoreError> {
    if ttl_seconds == 0 {
        return Err(CoreError::Validation(
            "Cache TTL must be at least one second".into(),
        ));
    }
    Ok(ttl_seconds)
}

fn namespaced(key: &str) -> String {
    format!("{}{}", KEY_NAMESPACE, key)
}

/// Session store backed by Redis. Entries are written with `SET .. EX` under
/// the `boardingmate:` namespace, so Redis expires them on its own.
#[derive(Clone, Debug)]
pub struct RedisCache {
    connection: MultiplexedConnection,
    default_ttl_seconds: u64,
}

impl RedisCache {
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> Result<Self, CoreError> {
        let default_ttl_seconds = checked_ttl(default_ttl_seconds)
            .map_err(|e| CoreError::Configuration(e.to_string()))?;
        let client = Client::open(redis_url)
            .map_err(|e| CoreError::Configuration(format!("Invalid Redis URL: {}", e)))?;
        let connection = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(remote)?;
        info!(ttl = default_ttl_seconds, "Redis session cache connected.");
        Ok(Self {
            connection,
            default_ttl_seconds,
        })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let mut conn = self.connection.clone();
        conn.get(namespaced(key)).await.map_err(remote)
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl_seconds: Option<u64>,
    ) -> Result<(), CoreError> {
        let ttl = checked_ttl(ttl_seconds.unwrap_or(self.default_ttl_seconds))?;
        let mut conn = self.connection.clone();
        conn.set_ex(namespaced(key), value, ttl).await.map_err(remote)
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.connection.clone();
        let removed: usize = conn.del(namespaced(key)).await.map_err(remote)?;
        debug!(removed, "Cache entry dropped");
        Ok(())
    }
}
