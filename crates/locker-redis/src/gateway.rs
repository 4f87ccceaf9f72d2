//! Redis gateway implementation.

use std::time::Duration;

use fred::prelude::*;
use locker_core::error::{LockError, LockResult};
use locker_core::gateway::{Acquisition, Gateway, ttl_millis};
use tracing::{Span, field, instrument};

use crate::script::{ACQUIRE_SCRIPT, RELEASE_SCRIPT, decode_acquire, decode_release};

/// Lock store backed by a single Redis server.
///
/// Each lock is one string key holding the token, with a native `PX` expiry.
/// Both operations run as Lua scripts, which Redis executes atomically.
#[derive(Clone)]
pub struct RedisGateway {
    client: RedisClient,
}

impl RedisGateway {
    /// Uses an existing Redis client.
    ///
    /// The client must be connected before the gateway is used.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connects to the Redis server at `url`.
    pub async fn connect(url: &str) -> LockResult<Self> {
        let config = RedisConfig::from_url(url).map_err(|e| {
            LockError::Connection(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid Redis URL: {}", e),
            )))
        })?;

        let client = RedisClient::new(config, None, None, None);
        client.connect();
        client
            .wait_for_connect()
            .await
            .map_err(|e| LockError::Connection(Box::new(e)))?;

        Ok(Self { client })
    }

    /// The underlying client.
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Closes the connection.
    pub async fn disconnect(&self) -> LockResult<()> {
        self.client
            .quit()
            .await
            .map_err(|e| LockError::Connection(Box::new(e)))
    }
}

impl std::fmt::Debug for RedisGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisGateway")
            .field("client", &self.client.id())
            .finish()
    }
}

impl Gateway for RedisGateway {
    #[instrument(skip(self, token), fields(backend = "redis", reply = field::Empty))]
    async fn acquire(&self, key: &str, token: &str, ttl: Duration) -> LockResult<Acquisition> {
        let px = ttl_millis(ttl)?;
        let args: Vec<RedisValue> = vec![token.into(), px.into()];

        let reply: RedisValue = self
            .client
            .eval(ACQUIRE_SCRIPT, key, args)
            .await
            .map_err(|e| LockError::Backend(Box::new(e)))?;
        Span::current().record("reply", field::debug(&reply));

        decode_acquire(key, reply)
    }

    #[instrument(skip(self, token), fields(backend = "redis", reply = field::Empty))]
    async fn release(&self, key: &str, token: &str) -> LockResult<bool> {
        let args: Vec<RedisValue> = vec![token.into()];

        let reply: RedisValue = self
            .client
            .eval(RELEASE_SCRIPT, key, args)
            .await
            .map_err(|e| LockError::Backend(Box::new(e)))?;
        Span::current().record("reply", field::debug(&reply));

        decode_release(key, reply)
    }
}
