//! In-memory implementation of the RemoteStore trait. Values and tag sets live
//! in one mutex-guarded keyspace (like Redis, a DEL removes either kind), and
//! every call is counted so tests can assert how often the remote tier was hit.
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::{AtomicOp, AtomicReply, RemoteError, RemoteStore};

#[derive(Default)]
struct Keyspace {
    values: HashMap<String, String>,
    expiries: HashMap<String, Instant>,
    sets: HashMap<String, HashSet<String>>,
}

impl Keyspace {
    fn purge_if_expired(&mut self, key: &str) {
        if let Some(deadline) = self.expiries.get(key) {
            if *deadline <= Instant::now() {
                self.values.remove(key);
                self.expiries.remove(key);
            }
        }
    }

    fn delete(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.expiries.remove(key);
        let value = self.values.remove(key).is_some();
        let set = self.sets.remove(key).is_some();
        value || set
    }

    fn members(&self, set: &str) -> HashSet<String> {
        self.sets.get(set).cloned().unwrap_or_default()
    }
}

pub struct InMemoryRemoteStore {
    keyspace: Mutex<Keyspace>,
    calls: AtomicUsize,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            keyspace: Mutex::new(Keyspace::default()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of store calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Keyspace>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keyspace
            .lock()
            .map_err(|e| RemoteError::Lock(e.to_string()))
    }
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let mut keyspace = self.lock()?;
        keyspace.purge_if_expired(key);
        Ok(keyspace.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        let mut keyspace = self.lock()?;
        keyspace.expiries.remove(key);
        keyspace.sets.remove(key);
        keyspace.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_ex(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &str,
    ) -> Result<(), RemoteError> {
        let mut keyspace = self.lock()?;
        keyspace.sets.remove(key);
        keyspace.values.insert(key.to_string(), value.to_string());
        keyspace.expiries.insert(
            key.to_string(),
            Instant::now() + Duration::from_secs(ttl_secs),
        );
        Ok(())
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<usize, RemoteError> {
        let mut keyspace = self.lock()?;
        let inserted = keyspace
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(usize::from(inserted))
    }

    async fn smembers(&self, set: &str) -> Result<HashSet<String>, RemoteError> {
        Ok(self.lock()?.members(set))
    }

    async fn srem(
        &self,
        set: &str,
        members: &[String],
    ) -> Result<usize, RemoteError> {
        let mut keyspace = self.lock()?;
        let Some(existing) = keyspace.sets.get_mut(set) else {
            return Ok(0);
        };
        let removed = members.iter().filter(|m| existing.remove(*m)).count();
        if existing.is_empty() {
            keyspace.sets.remove(set);
        }
        Ok(removed)
    }

    async fn execute_atomic(
        &self,
        op: AtomicOp,
        args: &[String],
    ) -> Result<AtomicReply, RemoteError> {
        // the guard spans the whole operation
        let mut keyspace = self.lock()?;
        match op {
            AtomicOp::Intersect => {
                let mut sets = args.iter().map(|set| keyspace.members(set));
                let first = sets.next().unwrap_or_default();
                let members = sets.fold(first, |acc, set| {
                    acc.intersection(&set).cloned().collect()
                });
                Ok(AtomicReply::Members(members))
            }
            AtomicOp::Delete => {
                let unique: HashSet<&String> = args.iter().collect();
                let count = unique.into_iter().filter(|k| keyspace.delete(k)).count();
                Ok(AtomicReply::Count(count))
            }
        }
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, RemoteError> {
        let mut keyspace = self.lock()?;
        let candidates: Vec<String> = keyspace.values.keys().cloned().collect();
        for key in &candidates {
            keyspace.purge_if_expired(key);
        }
        let mut keys: Vec<String> = keyspace
            .values
            .keys()
            .chain(keyspace.sets.keys())
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn ttl(&self, key: &str) -> Result<i64, RemoteError> {
        let mut keyspace = self.lock()?;
        keyspace.purge_if_expired(key);
        if let Some(deadline) = keyspace.expiries.get(key) {
            let left = deadline.saturating_duration_since(Instant::now());
            return Ok(left.as_secs() as i64);
        }
        if keyspace.values.contains_key(key) || keyspace.sets.contains_key(key) {
            Ok(-1)
        } else {
            Ok(-2)
        }
    }
}

/// Supports the `*` wildcard only, which is all the report needs.
fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if key.len() < first.len() + last.len()
        || !key.starts_with(first)
        || !key.ends_with(last)
    {
        return false;
    }
    let mut rest = &key[first.len()..key.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}

impl std::fmt::Debug for InMemoryRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("InMemoryRemoteStore");
        if let Ok(keyspace) = self.keyspace.lock() {
            s.field("values", &keyspace.values.len())
                .field("sets", &keyspace.sets.len());
        }
        s.field("calls", &self.calls()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_get_set_and_miss() {
        let store = InMemoryRemoteStore::new();
        assert_eq!(store.get("k1").await.unwrap(), None);
        store.set("k1", "body").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some("body".to_string()));
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_ex_expires() {
        let store = InMemoryRemoteStore::new();
        store.set_ex("k1", 10, "body").await.unwrap();
        assert_eq!(store.ttl("k1").await.unwrap(), 10);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.get("k1").await.unwrap(), None);
        assert_eq!(store.ttl("k1").await.unwrap(), -2);
    }

    #[tokio::test]
    async fn test_sadd_counts_new_members_only() {
        let store = InMemoryRemoteStore::new();
        assert_eq!(store.sadd("catalog", "k1").await.unwrap(), 1);
        assert_eq!(store.sadd("catalog", "k1").await.unwrap(), 0);
        assert_eq!(store.smembers("catalog").await.unwrap().len(), 1);
        assert!(store.smembers("absent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_srem_drops_empty_sets() {
        let store = InMemoryRemoteStore::new();
        store.sadd("catalog", "k1").await.unwrap();
        let removed = store
            .srem("catalog", &strings(&["k1", "k2"]))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.ttl("catalog").await.unwrap(), -2);
        assert_eq!(store.srem("absent", &strings(&["k1"])).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_atomic_intersect_and_delete() {
        let store = InMemoryRemoteStore::new();
        for key in ["k1", "k2"] {
            store.sadd("t1", key).await.unwrap();
        }
        for key in ["k2", "k3"] {
            store.sadd("t2", key).await.unwrap();
        }
        let members = store
            .execute_atomic(AtomicOp::Intersect, &strings(&["t1", "t2"]))
            .await
            .unwrap()
            .into_members()
            .unwrap();
        assert_eq!(members, HashSet::from(["k2".to_string()]));

        store.set("k2", "body").await.unwrap();
        let deleted = store
            .execute_atomic(AtomicOp::Delete, &strings(&["k2", "k2", "missing"]))
            .await
            .unwrap()
            .into_count()
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_set_replaces_a_set_under_the_same_key() {
        let store = InMemoryRemoteStore::new();
        store.sadd("k1", "member").await.unwrap();
        store.set("k1", "body").await.unwrap();
        assert!(store.smembers("k1").await.unwrap().is_empty());
        assert_eq!(store.keys("k1").await.unwrap(), strings(&["k1"]));

        store.sadd("k2", "member").await.unwrap();
        store.set_ex("k2", 30, "body").await.unwrap();
        assert!(store.smembers("k2").await.unwrap().is_empty());
        assert_eq!(store.get("k2").await.unwrap().as_deref(), Some("body"));
    }

    #[tokio::test]
    async fn test_keys_pattern() {
        let store = InMemoryRemoteStore::new();
        store.set("md1", "a").await.unwrap();
        store.set("md2", "b").await.unwrap();
        store.set("en1", "c").await.unwrap();
        assert_eq!(store.keys("md*").await.unwrap(), strings(&["md1", "md2"]));
        assert_eq!(store.keys("en1").await.unwrap(), strings(&["en1"]));
        assert_eq!(store.keys("*1").await.unwrap(), strings(&["en1", "md1"]));
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("md*", "md"));
        assert!(glob_match("a*c*e", "abcde"));
        assert!(!glob_match("a*c*e", "abde"));
        assert!(!glob_match("ab*ba", "aba"));
    }
}
