//! This module provides the trait a remote key/value store has to implement.
//! The store holds plain string values plus the tag sets, and can run a
//! multi-key operation atomically.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::RemoteError;

/// Multi-key operations that must not interleave with concurrent mutation of
/// the sets or keys they touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicOp {
    /// Intersection of the sets named by the arguments.
    Intersect,
    /// Deletion of every key named by the arguments.
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicReply {
    Members(HashSet<String>),
    Count(usize),
}

impl AtomicReply {
    pub fn into_members(self) -> Result<HashSet<String>, RemoteError> {
        match self {
            Self::Members(members) => Ok(members),
            Self::Count(count) => Err(RemoteError::UnexpectedReply {
                op: "members".to_string(),
                reply: count.to_string(),
            }),
        }
    }

    pub fn into_count(self) -> Result<usize, RemoteError> {
        match self {
            Self::Count(count) => Ok(count),
            Self::Members(members) => Err(RemoteError::UnexpectedReply {
                op: "count".to_string(),
                reply: format!("{} members", members.len()),
            }),
        }
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `GET`; a missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError>;
    /// `SET`
    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError>;
    /// `SETEX`
    async fn set_ex(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &str,
    ) -> Result<(), RemoteError>;
    /// `SADD`; returns how many members were actually inserted.
    async fn sadd(&self, set: &str, member: &str) -> Result<usize, RemoteError>;
    /// `SMEMBERS`; a missing set is empty.
    async fn smembers(&self, set: &str) -> Result<HashSet<String>, RemoteError>;
    /// `SREM`; returns how many members were actually removed.
    async fn srem(
        &self,
        set: &str,
        members: &[String],
    ) -> Result<usize, RemoteError>;
    /// Runs `op` against `args` as a single server-side command. Stores that
    /// shard their keyspace may split the work per key when the arguments do
    /// not share a shard.
    async fn execute_atomic(
        &self,
        op: AtomicOp,
        args: &[String],
    ) -> Result<AtomicReply, RemoteError>;
    /// `KEYS`; diagnostics only.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, RemoteError>;
    /// `TTL` in seconds; `-1` for no expiry, `-2` for a missing key.
    async fn ttl(&self, key: &str) -> Result<i64, RemoteError>;
}

pub type AbstractRemoteStore = Arc<dyn RemoteStore + Send + Sync>;
