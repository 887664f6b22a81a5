use async_trait::async_trait;
use derive_builder::Builder;
use std::sync::Arc;
use tiercache_remote::{RemoteCacheClient, Tag, is_metadata_key};
use tracing::{debug, warn};

use crate::{
    CacheRequest, CacheResponse, LocalStore, MetadataEntry, ProxyEngine,
    RequestScope, StoreError,
};

/// Raw key/value access, as the proxy engine's write path needs it.
#[async_trait]
pub trait EntryStorage: Send + Sync {
    /// Returns `None` on a miss in every tier.
    async fn load(
        &self,
        scope: &mut RequestScope,
        key: &str,
    ) -> Result<Option<String>, StoreError>;

    async fn save(
        &self,
        scope: &mut RequestScope,
        key: &str,
        data: &str,
    ) -> Result<(), StoreError>;
}

/// Storage contract of the reverse-proxy cache.
#[async_trait]
pub trait HttpStore: EntryStorage {
    /// Finds the stored response matching `request`, if its body is still
    /// available.
    async fn lookup(
        &self,
        scope: &mut RequestScope,
        request: &CacheRequest,
    ) -> Result<Option<CacheResponse>, StoreError>;

    /// Persists `response` and registers its tags; returns the metadata key.
    async fn write(
        &self,
        scope: &mut RequestScope,
        request: &CacheRequest,
        response: &CacheResponse,
    ) -> Result<String, StoreError>;
}

#[derive(Builder, Clone, Debug)]
#[builder(public, setter(into))]
pub struct TieredStoreOptions {
    /// Response header carrying the comma-separated tag list.
    #[builder(default = "String::from(\"x-cache-tags\")")]
    pub tag_header: String,
    /// When set, remote writes expire after this many seconds.
    #[builder(default = "None")]
    pub remote_ttl: Option<u64>,
}

impl Default for TieredStoreOptions {
    fn default() -> Self {
        Self {
            tag_header: String::from("x-cache-tags"),
            remote_ttl: None,
        }
    }
}

pub struct TieredStore {
    remote: RemoteCacheClient,
    local: Arc<dyn LocalStore>,
    engine: Arc<dyn ProxyEngine>,
    pub options: TieredStoreOptions,
}

impl TieredStore {
    pub fn new(
        remote: RemoteCacheClient,
        local: Arc<dyn LocalStore>,
        engine: Arc<dyn ProxyEngine>,
        options: TieredStoreOptions,
    ) -> Self {
        Self {
            remote,
            local,
            engine,
            options,
        }
    }

    pub fn remote(&self) -> &RemoteCacheClient {
        &self.remote
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Stored variants under `key`; an unreadable blob counts as none.
    async fn metadata(
        &self,
        scope: &mut RequestScope,
        key: &str,
    ) -> Result<Vec<MetadataEntry>, StoreError> {
        let Some(blob) = self.load(scope, key).await? else {
            return Ok(Vec::new());
        };
        match MetadataEntry::decode_list(&blob) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("{}: unreadable metadata, ignored: {}", key, e);
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl EntryStorage for TieredStore {
    async fn load(
        &self,
        scope: &mut RequestScope,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        // metadata must look the same from every node
        if is_metadata_key(key) {
            return Ok(self.remote.get(key).await?);
        }

        if let Some(value) = scope.get(key) {
            debug!("{}: request tier hit", key);
            return Ok(Some(value.clone()));
        }

        if let Some(value) = self.local.load(key).await? {
            debug!("{}: local tier hit", key);
            return Ok(Some(value));
        }

        let Some(value) = self.remote.get(key).await? else {
            debug!("{}: miss", key);
            return Ok(None);
        };

        debug!("{}: remote tier hit, backfilling", key);
        if let Err(e) = self.local.save(key, &value).await {
            warn!("{}: local backfill failed: {}", key, e);
        }
        scope.insert(key, value.clone());
        Ok(Some(value))
    }

    async fn save(
        &self,
        scope: &mut RequestScope,
        key: &str,
        data: &str,
    ) -> Result<(), StoreError> {
        match self.options.remote_ttl {
            Some(ttl) => self.remote.set_with_expiry(key, ttl, data).await?,
            None => self.remote.set(key, data).await?,
        }

        if !is_metadata_key(key) {
            self.local.save(key, data).await?;
            scope.insert(key, data);
        }
        Ok(())
    }
}

#[async_trait]
impl HttpStore for TieredStore {
    async fn lookup(
        &self,
        scope: &mut RequestScope,
        request: &CacheRequest,
    ) -> Result<Option<CacheResponse>, StoreError> {
        let key = self.engine.cache_key(request);
        let entries = self.metadata(scope, &key).await?;

        let Some(entry) = entries.into_iter().find(|entry| {
            self.engine
                .requests_match(&entry.vary(), &request.headers, &entry.request)
        }) else {
            return Ok(None);
        };

        let Some(digest) = entry.content_digest().map(str::to_string) else {
            warn!("{}: matched entry has no content digest", key);
            return Ok(None);
        };

        // body evicted while metadata survived: a plain miss
        match self.load(scope, &digest).await? {
            Some(body) => Ok(Some(self.engine.restore_response(&entry, body))),
            None => {
                debug!("{}: body {} gone, treating as miss", key, digest);
                Ok(None)
            }
        }
    }

    async fn write(
        &self,
        scope: &mut RequestScope,
        request: &CacheRequest,
        response: &CacheResponse,
    ) -> Result<String, StoreError> {
        let key = self.engine.write(self, scope, request, response).await?;

        if let Some(header) = response.header(&self.options.tag_header) {
            let tags = Tag::split_list(header);
            if !tags.is_empty() {
                self.remote.add_tags_to_key(&key, &tags).await?;
            }
        }
        Ok(key)
    }
}

impl std::fmt::Debug for TieredStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredStore")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
