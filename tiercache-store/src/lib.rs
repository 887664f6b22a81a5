//! Multi-tier storage for an HTTP response cache.
//!
//! [`TieredStore`] satisfies the proxy engine's `load`/`save`/`lookup`/`write`
//! contract over three tiers:
//!
//! - the per-request memory tier ([`RequestScope`]), dropped with the request
//! - the node-local persistent tier ([`LocalStore`], e.g. [`FsLocalStore`])
//! - the shared remote tier ([`tiercache_remote::RemoteCacheClient`])
//!
//! Metadata keys only ever live in the remote tier. Content keys are written
//! through to every tier and backfilled on a remote hit.
//!
//! HTTP semantics (cache keys, Vary matching, response restoration) belong to
//! a [`ProxyEngine`]; [`DigestProxyEngine`] is a small one.

mod error;
mod http;
mod local;
mod metadata;
mod scope;
mod tiered;

pub mod engine;

pub use engine::{DigestProxyEngine, ProxyEngine};
pub use error::StoreError;
pub use http::{CacheRequest, CacheResponse, Headers};
pub use local::{FsLocalStore, LocalStore};
pub use metadata::{CONTENT_DIGEST_HEADER, MetadataEntry};
pub use scope::RequestScope;
pub use tiered::{
    EntryStorage, HttpStore, TieredStore, TieredStoreOptions,
    TieredStoreOptionsBuilder, TieredStoreOptionsBuilderError,
};
