//! Typed settings for a tiercache node.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{ConfigError, Configurable};

/// Environment variable that overrides `remote.dsn`.
pub const DSN_ENV_VAR: &str = "TIERCACHE_REDIS_DSN";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSettings {
    /// `redis://host:port` or a bracketed list of endpoints for cluster mode.
    pub dsn: String,
    /// When set, remote writes expire after this many seconds.
    pub ttl: Option<u64>,
    /// Milliseconds allowed to establish a connection.
    pub connect_timeout_ms: Option<u64>,
    /// Milliseconds a single command may wait for its reply.
    pub command_timeout_ms: Option<u64>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            dsn: "redis://127.0.0.1:6379".to_string(),
            ttl: None,
            connect_timeout_ms: None,
            command_timeout_ms: Some(1000),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocalSettings {
    /// Root directory of the node-local persistent tier.
    pub root: PathBuf,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./http_cache"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TagSettings {
    /// Response header carrying the comma-separated tag list.
    pub header: String,
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            header: "x-cache-tags".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportSettings {
    /// Age in seconds above which a metadata key is flagged.
    pub threshold: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { threshold: 600 }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    pub remote: RemoteSettings,
    pub local: LocalSettings,
    pub tags: TagSettings,
    pub report: ReportSettings,
}

struct SettingsFile {
    config: serde_yaml::Value,
}

impl Configurable for SettingsFile {
    fn config(&self) -> &serde_yaml::Value {
        &self.config
    }
}

impl CacheSettings {
    /// Reads settings from a YAML file; absent sections keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = SettingsFile {
            config: SettingsFile::load_config(path)?,
        };
        Self::from_value(file.config().clone())
    }

    pub fn from_value(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Replaces `remote.dsn` when `dsn` holds a non-blank value.
    pub fn with_dsn_override(mut self, dsn: Option<String>) -> Self {
        if let Some(dsn) = dsn.filter(|d| !d.trim().is_empty()) {
            tracing::debug!("remote.dsn overridden to {}", dsn);
            self.remote.dsn = dsn;
        }
        self
    }

    /// Applies the `TIERCACHE_REDIS_DSN` override from the process environment.
    pub fn with_env(self) -> Self {
        self.with_dsn_override(std::env::var(DSN_ENV_VAR).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_for_empty_document() {
        let settings = CacheSettings::from_value(serde_yaml::Value::Null).unwrap();
        assert_eq!(settings, CacheSettings::default());
        assert_eq!(settings.remote.dsn, "redis://127.0.0.1:6379");
        assert_eq!(settings.tags.header, "x-cache-tags");
        assert_eq!(settings.report.threshold, 600);
        assert_eq!(settings.remote.connect_timeout_ms, None);
        assert_eq!(settings.remote.command_timeout_ms, Some(1000));
    }

    #[test]
    fn test_remote_timeouts() {
        let value: serde_yaml::Value = serde_yaml::from_str(
            "remote:\n  connect_timeout_ms: 2000\n  command_timeout_ms: 250",
        )
        .unwrap();
        let settings = CacheSettings::from_value(value).unwrap();
        assert_eq!(settings.remote.connect_timeout_ms, Some(2000));
        assert_eq!(settings.remote.command_timeout_ms, Some(250));
        assert_eq!(settings.remote.dsn, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiercache.yml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "remote:\n  dsn: \"[redis://a:6379, redis://b:6379]\"\n  ttl: 120\nlocal:\n  root: /tmp/http_cache"
        )
        .unwrap();

        let settings = CacheSettings::from_file(&path).unwrap();
        assert_eq!(settings.remote.dsn, "[redis://a:6379, redis://b:6379]");
        assert_eq!(settings.remote.ttl, Some(120));
        assert_eq!(settings.local.root, PathBuf::from("/tmp/http_cache"));
        assert_eq!(settings.tags, TagSettings::default());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("remote:\n  ttl: soon").unwrap();
        assert!(matches!(
            CacheSettings::from_value(value),
            Err(ConfigError::YamlParse(_))
        ));
    }

    #[test]
    fn test_dsn_override() {
        let settings = CacheSettings::default()
            .with_dsn_override(Some("redis://other:6380".to_string()));
        assert_eq!(settings.remote.dsn, "redis://other:6380");

        let settings = settings.with_dsn_override(Some("  ".to_string()));
        assert_eq!(settings.remote.dsn, "redis://other:6380");

        let settings = settings.with_dsn_override(None);
        assert_eq!(settings.remote.dsn, "redis://other:6380");
    }
}
