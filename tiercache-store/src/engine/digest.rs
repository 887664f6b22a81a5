use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::{
    CONTENT_DIGEST_HEADER, CacheRequest, CacheResponse, EntryStorage, Headers,
    MetadataEntry, ProxyEngine, RequestScope, StoreError,
};
use tiercache_remote::METADATA_PREFIX;

const STATUS_HEADER: &str = "x-status";
const CONTENT_PREFIX: &str = "en";

/// Content-addressed engine: metadata under `md` + sha256(uri), bodies under
/// `en` + sha256(body), variants matched on their Vary headers.
#[derive(Debug, Clone, Default)]
pub struct DigestProxyEngine;

impl DigestProxyEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn content_key(body: &str) -> String {
        format!("{}{}", CONTENT_PREFIX, hex::encode(Sha256::digest(body.as_bytes())))
    }
}

#[async_trait]
impl ProxyEngine for DigestProxyEngine {
    fn cache_key(&self, request: &CacheRequest) -> String {
        format!(
            "{}{}",
            METADATA_PREFIX,
            hex::encode(Sha256::digest(request.uri.as_bytes()))
        )
    }

    fn requests_match(&self, vary: &str, request: &Headers, stored: &Headers) -> bool {
        vary.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
            .map(str::to_ascii_lowercase)
            .all(|name| request.get(&name) == stored.get(&name))
    }

    fn restore_response(&self, entry: &MetadataEntry, body: String) -> CacheResponse {
        let mut headers = entry.response.clone();
        let status = headers
            .remove(STATUS_HEADER)
            .and_then(|values| values.first().and_then(|s| s.parse().ok()))
            .unwrap_or(200);
        CacheResponse {
            status,
            headers,
            body,
        }
    }

    async fn write(
        &self,
        storage: &dyn EntryStorage,
        scope: &mut RequestScope,
        request: &CacheRequest,
        response: &CacheResponse,
    ) -> Result<String, StoreError> {
        let digest = Self::content_key(&response.body);
        if storage.load(scope, &digest).await?.is_none() {
            storage.save(scope, &digest, &response.body).await?;
        }

        let mut headers = response.headers.clone();
        headers.insert(CONTENT_DIGEST_HEADER.to_string(), vec![digest]);
        headers.insert(STATUS_HEADER.to_string(), vec![response.status.to_string()]);
        let entry = MetadataEntry::new(request.headers.clone(), headers);
        let vary = entry.vary();

        let key = self.cache_key(request);
        let existing = match storage.load(scope, &key).await? {
            Some(blob) => MetadataEntry::decode_list(&blob).unwrap_or_else(|e| {
                tracing::warn!("{}: unreadable metadata, overwritten: {}", key, e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        // the new variant replaces any stored one it would shadow
        let mut entries = vec![entry];
        entries.extend(existing.into_iter().filter(|old| {
            old.vary() != vary
                || !self.requests_match(&vary, &old.request, &request.headers)
        }));

        storage
            .save(scope, &key, &MetadataEntry::encode_list(&entries)?)
            .await?;
        Ok(key)
    }
}
