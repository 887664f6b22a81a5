//! Key classes.
//!
//! Keys starting with [`METADATA_PREFIX`] hold metadata (the list of stored
//! request/response variants for one cache key). Every other key is a content
//! digest holding a response body.

pub const METADATA_PREFIX: &str = "md";

pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with(METADATA_PREFIX)
}
