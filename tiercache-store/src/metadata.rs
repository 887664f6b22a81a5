use serde::{Deserialize, Serialize};

use crate::StoreError;
use crate::http::{Headers, first_header};

/// Response header pointing at the content key holding the body.
pub const CONTENT_DIGEST_HEADER: &str = "x-content-digest";

/// One stored variant under a metadata key: the Vary-relevant request headers
/// it was produced for, and the response headers to restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub request: Headers,
    pub response: Headers,
}

impl MetadataEntry {
    pub fn new(request: Headers, response: Headers) -> Self {
        Self { request, response }
    }

    pub fn content_digest(&self) -> Option<&str> {
        first_header(&self.response, CONTENT_DIGEST_HEADER)
    }

    /// `vary` values joined with `", "`, empty when the response had none.
    pub fn vary(&self) -> String {
        self.response
            .get("vary")
            .map(|values| values.join(", "))
            .unwrap_or_default()
    }

    pub fn decode_list(blob: &str) -> Result<Vec<MetadataEntry>, StoreError> {
        Ok(serde_json::from_str(blob)?)
    }

    pub fn encode_list(entries: &[MetadataEntry]) -> Result<String, StoreError> {
        Ok(serde_json::to_string(entries)?)
    }
}
