use async_trait::async_trait;
use rustis::client::{Client, IntoConfig};
use rustis::commands::{GenericCommands, SetCommands, StringCommands};
use std::collections::HashSet;

use crate::{
    AtomicOp, AtomicReply, ConnectOptions, Dsn, RemoteError, RemoteStore,
};

/// Redis-backed remote store, single node or cluster.
///
/// On a single node, atomic operations are the native multi-key `SINTER` and
/// `DEL`. A cluster rejects those when the keys hash to different slots, and
/// metadata keys are content hashes, so there the intersection is computed
/// from `SMEMBERS` replies and keys are deleted one by one. Neither step is
/// atomic across slots.
#[derive(Clone)]
pub struct RedisRemoteStore {
    pub client: Client,
    pub dsn: Dsn,
}

impl RedisRemoteStore {
    pub fn new(client: Client, dsn: Dsn) -> Self {
        Self { client, dsn }
    }

    /// Connects to the endpoint(s) described by `dsn`.
    pub async fn connect(dsn: &str) -> Result<Self, RemoteError> {
        Self::connect_with(dsn, ConnectOptions::default()).await
    }

    /// Same as [`connect`](Self::connect); timeouts set in `options` win over
    /// the ones carried by the descriptor.
    pub async fn connect_with(
        dsn: &str,
        options: ConnectOptions,
    ) -> Result<Self, RemoteError> {
        let parsed = Dsn::parse(dsn)?;
        let mut config = parsed
            .to_connection_string()
            .into_config()
            .map_err(|e| RemoteError::InvalidDsn(format!("{}: {}", dsn, e)))?;
        if let Some(timeout) = options.connect_timeout {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = options.command_timeout {
            config.command_timeout = timeout;
        }

        let client = Client::connect(config)
            .await
            .map_err(|e| RemoteError::Connection {
                dsn: dsn.to_string(),
                reason: e.to_string(),
            })?;
        tracing::info!(
            "Connected to remote store {} (cluster: {})",
            dsn,
            parsed.is_cluster()
        );
        Ok(Self::new(client, parsed))
    }
}

#[async_trait]
impl RemoteStore for RedisRemoteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        self.client.set(key, value).await?;
        Ok(())
    }

    async fn set_ex(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &str,
    ) -> Result<(), RemoteError> {
        self.client.setex(key, ttl_secs, value).await?;
        Ok(())
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<usize, RemoteError> {
        let added = self.client.sadd(set, member).await?;
        Ok(added)
    }

    async fn smembers(&self, set: &str) -> Result<HashSet<String>, RemoteError> {
        let members: HashSet<String> = self.client.smembers(set).await?;
        Ok(members)
    }

    async fn srem(
        &self,
        set: &str,
        members: &[String],
    ) -> Result<usize, RemoteError> {
        if members.is_empty() {
            return Ok(0);
        }
        let removed = self.client.srem(set, members.to_vec()).await?;
        Ok(removed)
    }

    async fn execute_atomic(
        &self,
        op: AtomicOp,
        args: &[String],
    ) -> Result<AtomicReply, RemoteError> {
        if args.is_empty() {
            return Ok(match op {
                AtomicOp::Intersect => AtomicReply::Members(HashSet::new()),
                AtomicOp::Delete => AtomicReply::Count(0),
            });
        }

        match (op, self.dsn.is_cluster()) {
            (AtomicOp::Intersect, false) => {
                let members: HashSet<String> =
                    self.client.sinter(args.to_vec()).await?;
                Ok(AtomicReply::Members(members))
            }
            (AtomicOp::Delete, false) => {
                let count = self.client.del(args.to_vec()).await?;
                Ok(AtomicReply::Count(count))
            }
            (AtomicOp::Intersect, true) => {
                let mut sets = Vec::with_capacity(args.len());
                for set in args {
                    sets.push(self.smembers(set).await?);
                }
                Ok(AtomicReply::Members(intersect_all(sets)))
            }
            (AtomicOp::Delete, true) => {
                let mut count = 0;
                for key in unique(args) {
                    count += self.client.del(key).await?;
                }
                Ok(AtomicReply::Count(count))
            }
        }
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, RemoteError> {
        let keys: Vec<String> = self.client.keys(pattern).await?;
        Ok(keys)
    }

    async fn ttl(&self, key: &str) -> Result<i64, RemoteError> {
        let ttl = self.client.ttl(key).await?;
        Ok(ttl)
    }
}

/// Intersection of `sets`; no sets at all is the empty set.
fn intersect_all(sets: Vec<HashSet<String>>) -> HashSet<String> {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return HashSet::new();
    };
    sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect())
}

fn unique(keys: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    keys.iter()
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect()
}

impl std::fmt::Debug for RedisRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRemoteStore")
            .field("dsn", &self.dsn)
            .finish()
    }
}
