//! HTTP semantics the store delegates to.
//!
//! The store never decides what a cache key is, whether a stored variant fits
//! a request, or how a response is rebuilt. A [`ProxyEngine`] does, and its
//! `write` persists entries by calling back into the store's [`EntryStorage`].
mod digest;

pub use digest::DigestProxyEngine;

use async_trait::async_trait;

use crate::{
    CacheRequest, CacheResponse, EntryStorage, Headers, MetadataEntry,
    RequestScope, StoreError,
};

#[async_trait]
pub trait ProxyEngine: Send + Sync {
    /// Metadata key for `request`.
    fn cache_key(&self, request: &CacheRequest) -> String;

    /// Whether a variant stored for `stored` headers serves `request` headers,
    /// given the stored response's `vary` value.
    fn requests_match(&self, vary: &str, request: &Headers, stored: &Headers) -> bool;

    fn restore_response(&self, entry: &MetadataEntry, body: String) -> CacheResponse;

    /// Persists body and metadata through `storage`; returns the metadata key.
    async fn write(
        &self,
        storage: &dyn EntryStorage,
        scope: &mut RequestScope,
        request: &CacheRequest,
        response: &CacheResponse,
    ) -> Result<String, StoreError>;
}
