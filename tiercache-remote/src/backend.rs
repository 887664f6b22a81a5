pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::InMemoryRemoteStore;
#[cfg(feature = "redis")]
pub use redis::RedisRemoteStore;
