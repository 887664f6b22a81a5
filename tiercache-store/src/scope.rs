use std::collections::HashMap;

/// Per-request memory tier.
///
/// Owned by the code handling one request and passed by `&mut` into every
/// store call of that request; dropped when the request ends. Only content
/// keys are ever put here.
#[derive(Debug, Default)]
pub struct RequestScope {
    entries: HashMap<String, String>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
