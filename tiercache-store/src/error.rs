use thiserror::Error;
use tiercache_remote::RemoteError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote tier error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Local tier IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Key not usable as a local path: {0:?}")]
    InvalidKey(String),
}
