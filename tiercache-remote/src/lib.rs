//! Shared remote tier for tiercache.
//!
//! [`RemoteCacheClient`] wraps one logical key/value store (single Redis
//! endpoint or a cluster) behind the [`RemoteStore`] trait and maintains the
//! tag index used for bulk invalidation:
//!
//! - every tag is a set of the cache keys carrying it
//! - [`RemoteCacheClient::add_tags_to_key`] registers a key under tags
//! - [`RemoteCacheClient::remove_keys_from_tags`] deletes every key matching a
//!   union-of-intersections [`TagExpression`] and scrubs it from the index
pub mod backend;
pub mod client;
pub mod dsn;
pub mod keys;
pub mod store;
pub mod tag_index;
pub mod tags;

pub use crate::backend::InMemoryRemoteStore;
#[cfg(feature = "redis")]
pub use crate::backend::RedisRemoteStore;
pub use crate::client::RemoteCacheClient;
pub use crate::dsn::{ConnectOptions, Dsn};
pub use crate::keys::{METADATA_PREFIX, is_metadata_key};
pub use crate::store::{AtomicOp, AtomicReply, RemoteStore};
pub use crate::tags::{Invalidation, Tag, TagExpression};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Cannot connect to remote store with {dsn}: {reason}")]
    Connection { dsn: String, reason: String },
    #[error("Invalid connection descriptor: {0}")]
    InvalidDsn(String),
    #[error("Unexpected reply for {op}: {reply}")]
    UnexpectedReply { op: String, reply: String },
    #[error("Store lock poisoned: {0}")]
    Lock(String),
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    RedisError(#[from] rustis::Error),
}
