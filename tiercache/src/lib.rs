//! # tiercache
//!
//! Storage backend for an HTTP response cache: response bodies and variant
//! metadata spread over a per-request memory tier, a node-local persistent
//! tier and a shared Redis tier, plus tag-based bulk invalidation.
//!
//! ## Modules
//!
//! - `config`: YAML configuration and typed [`CacheSettings`].
//! - `remote`: the shared tier client and its tag index.
//! - `store`: the multi-tier adapter the proxy engine talks to.
//! - `report`: age report over stored metadata.
//! - `logging`: tracing subscriber setup.
pub mod logging;
pub mod prelude;
pub mod report;

pub use tiercache_config as config;
pub use tiercache_remote as remote;
pub use tiercache_store as store;

// re-export
pub use async_trait;
pub use tracing;
pub use tracing_subscriber;

use std::sync::Arc;
use tiercache_config::CacheSettings;
use tiercache_remote::{ConnectOptions, RemoteCacheClient};
use tiercache_store::{
    FsLocalStore, ProxyEngine, StoreError, TieredStore, TieredStoreOptions,
};

/// Adapter options as described by `settings`.
pub fn store_options(settings: &CacheSettings) -> TieredStoreOptions {
    TieredStoreOptions {
        tag_header: settings.tags.header.clone(),
        remote_ttl: settings.remote.ttl,
    }
}

/// Client timeouts as described by `settings`.
pub fn connect_options(settings: &CacheSettings) -> ConnectOptions {
    ConnectOptions::from_millis(
        settings.remote.connect_timeout_ms,
        settings.remote.command_timeout_ms,
    )
}

/// Connects to the remote tier and assembles a [`TieredStore`] with a
/// filesystem local tier rooted at `local.root`.
pub async fn connect_store(
    settings: &CacheSettings,
    engine: Arc<dyn ProxyEngine>,
) -> Result<TieredStore, StoreError> {
    let remote =
        RemoteCacheClient::connect_with(&settings.remote.dsn, connect_options(settings))
            .await?;
    Ok(build_store(remote, settings, engine))
}

pub fn build_store(
    remote: RemoteCacheClient,
    settings: &CacheSettings,
    engine: Arc<dyn ProxyEngine>,
) -> TieredStore {
    TieredStore::new(
        remote,
        Arc::new(FsLocalStore::new(settings.local.root.clone())),
        engine,
        store_options(settings),
    )
}
