//! Connection descriptors.
//!
//! Either a single endpoint (`redis://host:port`, scheme optional) or a
//! bracketed list of endpoints separated by commas and/or whitespace, which
//! selects cluster mode: `[redis://a:6379, redis://b:6379]`.
//!
//! Endpoints may carry client options as a query string
//! (`redis://a:6379?command_timeout=500`). In a cluster list every endpoint
//! that carries one must carry the same one.
use std::time::Duration;

use crate::RemoteError;

const DEFAULT_SCHEME: &str = "redis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dsn {
    Single(String),
    Cluster(Vec<String>),
}

impl Dsn {
    pub fn parse(raw: &str) -> Result<Self, RemoteError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RemoteError::InvalidDsn("empty descriptor".to_string()));
        }

        let Some(inner) = raw.strip_prefix('[') else {
            if raw.ends_with(']') {
                return Err(RemoteError::InvalidDsn(raw.to_string()));
            }
            return Ok(Self::Single(with_scheme(raw)));
        };
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| RemoteError::InvalidDsn(raw.to_string()))?;

        let endpoints: Vec<String> = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|ep| !ep.is_empty())
            .map(with_scheme)
            .collect();

        if endpoints.is_empty() {
            return Err(RemoteError::InvalidDsn(format!(
                "no endpoints in {}",
                raw
            )));
        }

        let mut queries = endpoints.iter().filter_map(|ep| split_query(ep).1);
        if let Some(first) = queries.next() {
            if queries.any(|q| q != first) {
                return Err(RemoteError::InvalidDsn(format!(
                    "conflicting endpoint options in {}",
                    raw
                )));
            }
        }
        Ok(Self::Cluster(endpoints))
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }

    /// Renders the descriptor as a rustis connection string. Cluster
    /// endpoint options move after the host list, where rustis reads them.
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::Single(endpoint) => endpoint.clone(),
            Self::Cluster(endpoints) => {
                let tls = endpoints.iter().any(|ep| ep.starts_with("rediss://"));
                let query = endpoints.iter().find_map(|ep| split_query(ep).1);
                let hosts: Vec<&str> = endpoints
                    .iter()
                    .map(|ep| strip_scheme(split_query(ep).0))
                    .collect();
                let mut rendered = format!(
                    "{}+cluster://{}",
                    if tls { "rediss" } else { DEFAULT_SCHEME },
                    hosts.join(",")
                );
                if let Some(query) = query {
                    rendered.push('?');
                    rendered.push_str(query);
                }
                rendered
            }
        }
    }
}

/// Client timeouts applied on top of whatever the descriptor carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// How long establishing a connection may take.
    pub connect_timeout: Option<Duration>,
    /// How long a single command may wait for its reply.
    pub command_timeout: Option<Duration>,
}

impl ConnectOptions {
    pub fn from_millis(connect: Option<u64>, command: Option<u64>) -> Self {
        Self {
            connect_timeout: connect.map(Duration::from_millis),
            command_timeout: command.map(Duration::from_millis),
        }
    }
}

impl std::str::FromStr for Dsn {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn with_scheme(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, endpoint)
    }
}

fn split_query(endpoint: &str) -> (&str, Option<&str>) {
    match endpoint.split_once('?') {
        Some((host, query)) if !query.is_empty() => (host, Some(query)),
        Some((host, _)) => (host, None),
        None => (endpoint, None),
    }
}

fn strip_scheme(endpoint: &str) -> &str {
    let host = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    host.trim_end_matches('/')
}
