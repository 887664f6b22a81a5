//! Node-local persistent tier.
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::StoreError;

#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Returns `None` on a miss.
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn save(&self, key: &str, data: &str) -> Result<(), StoreError>;
}

/// Directory tree keyed by cache key: `root/ab/cd/ef/rest` for key
/// `abcdefrest`. Keys of six characters or fewer sit directly under `root`.
///
/// Keys are restricted to ASCII letters, digits, `-` and `_`; anything else
/// is [`StoreError::InvalidKey`]. Content keys can arrive from the shared
/// tier, so they never reach the filesystem unchecked.
///
/// No locking: concurrent writers of one key race and the last rename wins,
/// which is harmless for content-addressed bodies.
#[derive(Debug, Clone)]
pub struct FsLocalStore {
    root: PathBuf,
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FsLocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where `key` lives on this node.
    pub fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if key.len() <= 6 {
            return Ok(self.root.join(key));
        }
        Ok(self
            .root
            .join(&key[0..2])
            .join(&key[2..4])
            .join(&key[4..6])
            .join(&key[6..]))
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[async_trait]
impl LocalStore for FsLocalStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path(key)?).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, data: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // write aside, then rename over: readers never see a partial body
        let tmp = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_path_layout() {
        let store = FsLocalStore::new("/cache");
        assert_eq!(
            store.path("en6f1ed002ab").unwrap(),
            PathBuf::from("/cache/en/6f/1e/d002ab")
        );
        assert_eq!(store.path("short").unwrap(), PathBuf::from("/cache/short"));
        assert_eq!(
            store.path("md_abc-123").unwrap(),
            PathBuf::from("/cache/md/_a/bc/-123")
        );
    }

    #[test]
    fn test_path_rejects_keys_leaving_root() {
        let store = FsLocalStore::new("/cache");
        for key in [
            "",
            "..",
            "../escaped-body",
            "../../etc/hostname",
            "/etc/passwd",
            "en/../../x",
            "en\\..\\x",
            "en.body",
            "ényyyyyy",
        ] {
            assert!(
                matches!(store.path(key), Err(StoreError::InvalidKey(_))),
                "{key:?} accepted"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_key_never_touches_disk() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cache");
        let store = FsLocalStore::new(&root);

        let saved = store.save("../escaped-body", "x").await;
        assert!(matches!(saved, Err(StoreError::InvalidKey(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        std::fs::write(dir.path().join("secret"), "host file").unwrap();
        let loaded = store.load("../secret").await;
        assert!(matches!(loaded, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_miss_then_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FsLocalStore::new(dir.path());

        assert_eq!(store.load("en0123456789").await.unwrap(), None);
        store.save("en0123456789", "<html>body</html>").await.unwrap();
        assert_eq!(
            store.load("en0123456789").await.unwrap().as_deref(),
            Some("<html>body</html>")
        );
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = FsLocalStore::new(dir.path());

        store.save("en0123456789", "one").await.unwrap();
        store.save("en0123456789", "two").await.unwrap();
        assert_eq!(
            store.load("en0123456789").await.unwrap().as_deref(),
            Some("two")
        );

        let leaf = store.path("en0123456789").unwrap();
        let siblings = std::fs::read_dir(leaf.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }
}
