use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{
    AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError,
};
use tokio::sync::OnceCell;

use crate::config::RedisConfig;

const CONNECT_RETRIES: usize = 1;
const TIMEOUT: Duration = Duration::from_secs(1);

/// Shared Redis handle.
///
/// One instance is created at startup and cloned into every request context.
/// Cloning only bumps reference counts; the multiplexed connection is opened
/// on first use and shared by all clones afterwards.
#[derive(Clone)]
pub struct CacheClient {
    client: Arc<Client>,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl CacheClient {
    pub fn open(redis_url: &str) -> Result<Self, RedisError> {
        Ok(Self::with_client(Client::open(redis_url)?))
    }

    /// Builds the client from structured settings, so the password reaches
    /// Redis as-is whatever characters it contains.
    pub fn from_config(config: &RedisConfig) -> Result<Self, RedisError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                password: config.password.clone(),
                ..Default::default()
            },
        };
        Ok(Self::with_client(Client::open(info)?))
    }

    fn with_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            manager: Arc::new(OnceCell::new()),
        }
    }

    pub async fn connection(&self) -> Result<ConnectionManager, RedisError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                tracing::debug!("opening redis connection manager");
                // two attempts at most, one second each
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(CONNECT_RETRIES)
                    .set_connection_timeout(TIMEOUT)
                    .set_response_timeout(TIMEOUT);
                self.client.get_connection_manager_with_config(config).await
            })
            .await?;
        Ok(manager.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.manager.initialized()
    }
}

/// Fixed-window request counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HitCounter: Send + Sync {
    /// Increments `key` and returns the new count. The first hit of a window
    /// sets the key's expiry to `window_secs`.
    async fn hit(&self, key: String, window_secs: u64) -> Result<u64, RedisError>;
}

#[async_trait]
impl HitCounter for CacheClient {
    async fn hit(&self, key: String, window_secs: u64) -> Result<u64, RedisError> {
        let mut conn = self.connection().await?;
        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            let _: () = conn.expire(&key, window_secs as i64).await?;
        }
        Ok(count)
    }
}
