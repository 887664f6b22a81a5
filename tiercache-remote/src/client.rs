use std::sync::Arc;

use crate::store::AbstractRemoteStore;
use crate::{AtomicOp, AtomicReply, RemoteError, RemoteStore};

/// Handle to the shared remote tier.
///
/// Cheap to clone; all clones talk to the same store. Construct it once with
/// [`RemoteCacheClient::connect`] (or [`RemoteCacheClient::new`] around any
/// [`RemoteStore`]) and hand it to whatever needs the remote tier.
#[derive(Clone)]
pub struct RemoteCacheClient {
    store: AbstractRemoteStore,
}

impl RemoteCacheClient {
    pub fn new(store: Arc<dyn RemoteStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Connects to Redis. Failing to connect is fatal for the caller: without
    /// the remote tier there is no authoritative metadata.
    #[cfg(feature = "redis")]
    pub async fn connect(dsn: &str) -> Result<Self, RemoteError> {
        Self::connect_with(dsn, crate::ConnectOptions::default()).await
    }

    /// Connects to Redis with explicit client timeouts.
    #[cfg(feature = "redis")]
    pub async fn connect_with(
        dsn: &str,
        options: crate::ConnectOptions,
    ) -> Result<Self, RemoteError> {
        let store = crate::RedisRemoteStore::connect_with(dsn, options).await?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn store(&self) -> &AbstractRemoteStore {
        &self.store
    }

    /// Returns `None` on a miss.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        self.store.get(key).await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        self.store.set(key, value).await
    }

    pub async fn set_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &str,
    ) -> Result<(), RemoteError> {
        self.store.set_ex(key, ttl_secs, value).await
    }

    pub async fn execute_atomic(
        &self,
        op: AtomicOp,
        args: &[String],
    ) -> Result<AtomicReply, RemoteError> {
        self.store.execute_atomic(op, args).await
    }

    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, RemoteError> {
        self.store.keys(pattern).await
    }

    pub async fn ttl(&self, key: &str) -> Result<i64, RemoteError> {
        self.store.ttl(key).await
    }
}

impl std::fmt::Debug for RemoteCacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCacheClient").finish_non_exhaustive()
    }
}
