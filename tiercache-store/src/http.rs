use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header map with lowercased names; a header may repeat.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Request as seen by the store: enough to derive a cache key and match Vary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRequest {
    pub method: String,
    pub uri: String,
    pub headers: Headers,
}

impl CacheRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            uri: uri.into(),
            headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        append_header(&mut self.headers, name, value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

impl CacheResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        append_header(&mut self.headers, name, value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

pub(crate) fn append_header(headers: &mut Headers, name: &str, value: String) {
    headers
        .entry(name.to_ascii_lowercase())
        .or_default()
        .push(value);
}

pub(crate) fn first_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_ascii_lowercase())
        .and_then(|values| values.first())
        .map(String::as_str)
}
