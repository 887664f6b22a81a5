//! Configuration for tiercache deployments.
//!
//! Two layers: the [`Configurable`] trait, which reads a YAML document, and the
//! typed [`CacheSettings`] the store and the operator binary are built from.
pub mod config;
pub mod settings;

pub use config::{ConfigError, Configurable};
pub use settings::{
    CacheSettings, LocalSettings, RemoteSettings, ReportSettings, TagSettings,
};
