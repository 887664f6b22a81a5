//! Age report over stored metadata.
//!
//! Walks every metadata key in the remote tier, reads the `date` and
//! `cache-control` of its newest variant and lists keys oldest-last, flagging
//! those older than a threshold.
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use tiercache_remote::{METADATA_PREFIX, RemoteCacheClient, RemoteError};
use tiercache_store::MetadataEntry;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Threshold must be a strictly positive number of seconds, got {0}")]
    InvalidThreshold(i64),
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub age_secs: i64,
    pub date: String,
    pub key: String,
    pub cache_control: String,
    pub over_threshold: bool,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            if self.over_threshold { ">" } else { "" },
            self.age_secs,
            self.date,
            self.key,
            self.cache_control
        )
    }
}

pub fn validate_threshold(threshold: i64) -> Result<u64, ReportError> {
    if threshold < 1 {
        return Err(ReportError::InvalidThreshold(threshold));
    }
    Ok(threshold as u64)
}

/// Builds one line per readable metadata key, sorted by ascending age.
pub async fn collect(
    client: &RemoteCacheClient,
    threshold: u64,
    now: DateTime<Utc>,
) -> Result<Vec<ReportLine>, ReportError> {
    let keys = client.keys(&format!("{}*", METADATA_PREFIX)).await?;

    let mut lines = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(blob) = client.get(&key).await? else {
            continue;
        };
        match line_for(&key, &blob, threshold, now) {
            Some(line) => lines.push(line),
            None => tracing::warn!("{}: unreadable metadata, skipped", key),
        }
    }

    lines.sort_by(|a, b| a.age_secs.cmp(&b.age_secs).then_with(|| a.key.cmp(&b.key)));
    Ok(lines)
}

fn line_for(
    key: &str,
    blob: &str,
    threshold: u64,
    now: DateTime<Utc>,
) -> Option<ReportLine> {
    let entries = MetadataEntry::decode_list(blob).ok()?;
    let response = &entries.first()?.response;

    let date = response.get("date")?.first()?.clone();
    let stamp = DateTime::parse_from_rfc2822(&date).ok()?;
    let age_secs = (now - stamp.with_timezone(&Utc)).num_seconds();
    let cache_control = response
        .get("cache-control")
        .and_then(|values| values.first())
        .cloned()
        .unwrap_or_default();

    Some(ReportLine {
        age_secs,
        date,
        key: key.to_string(),
        cache_control,
        over_threshold: age_secs > threshold as i64,
    })
}
