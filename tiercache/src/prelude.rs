pub use tiercache_config::{CacheSettings, ConfigError, Configurable};
pub use tiercache_remote::{
    Invalidation, RemoteCacheClient, RemoteError, RemoteStore, Tag,
    TagExpression, is_metadata_key,
};
pub use tiercache_store::{
    CacheRequest, CacheResponse, DigestProxyEngine, EntryStorage, FsLocalStore,
    HttpStore, LocalStore, ProxyEngine, RequestScope, StoreError, TieredStore,
    TieredStoreOptions,
};
