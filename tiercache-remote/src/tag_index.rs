//! Tag index on top of the remote tier.
//!
//! Each tag is a set of cache keys. Invalidation resolves a
//! [`TagExpression`] to candidate keys, deletes them, then removes them from
//! every tag set the expression referenced.
//!
//! Deletion and index cleanup are two separate steps. An
//! `add_tags_to_key` for a just-deleted key that lands between them leaves
//! that key's membership behind in a tag set. Callers that cannot accept this
//! window must serialize invalidations against writes for the same tags.
use std::collections::{BTreeSet, HashSet};

use crate::{
    AtomicOp, Invalidation, RemoteCacheClient, RemoteError, RemoteStore, Tag,
    TagExpression,
};

impl RemoteCacheClient {
    /// Adds `key` to the set of every tag. Returns how many memberships were
    /// new; a tag already carrying the key does not count, so the result can
    /// be lower than `tags.len()` on success.
    pub async fn add_tags_to_key<T>(
        &self,
        key: &str,
        tags: &[T],
    ) -> Result<usize, RemoteError>
    where
        T: AsRef<str> + Sync,
    {
        let mut added = 0;
        for tag in tags.iter().map(|t| Tag::new(t.as_ref())) {
            if tag.is_empty() {
                continue;
            }
            added += self.store().sadd(tag.as_str(), key).await?;
        }
        tracing::debug!("Tagged {} ({} new memberships)", key, added);
        Ok(added)
    }

    /// Deletes every key matching `expr` and removes those keys from the tag
    /// sets `expr` references.
    pub async fn remove_keys_from_tags(
        &self,
        expr: impl Into<TagExpression>,
    ) -> Result<Invalidation, RemoteError> {
        let groups = expr.into().into_groups();

        let mut candidates: HashSet<String> = HashSet::new();
        for group in &groups {
            candidates.extend(self.resolve_group(group).await?);
        }

        if candidates.is_empty() {
            return Ok(Invalidation::default());
        }

        let keys: Vec<String> = candidates.into_iter().collect();
        let really_deleted = self
            .execute_atomic(AtomicOp::Delete, &keys)
            .await?
            .into_count()?;

        let referenced: BTreeSet<&Tag> = groups.iter().flatten().collect();
        for tag in referenced {
            self.store().srem(tag.as_str(), &keys).await?;
        }

        let invalidation = Invalidation {
            attempted: keys.into_iter().collect(),
            really_deleted,
        };
        if invalidation.already_gone() > 0 {
            tracing::warn!(
                "Invalidated {} keys, {} were already gone",
                invalidation.attempted.len(),
                invalidation.already_gone()
            );
        } else {
            tracing::info!("Invalidated {} keys", invalidation.attempted.len());
        }
        Ok(invalidation)
    }

    async fn resolve_group(
        &self,
        group: &[Tag],
    ) -> Result<HashSet<String>, RemoteError> {
        match group {
            [] => Ok(HashSet::new()),
            [tag] => self.store().smembers(tag.as_str()).await,
            tags => {
                let names: Vec<String> =
                    tags.iter().map(|t| t.as_str().to_string()).collect();
                self.execute_atomic(AtomicOp::Intersect, &names)
                    .await?
                    .into_members()
            }
        }
    }
}
