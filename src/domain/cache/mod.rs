//! Cache domain - expiring key-value store abstraction

mod key;
mod repository;

pub use key::CacheKey;
pub use repository::{Cache, CacheExt, KeyStream};

#[cfg(test)]
pub use repository::mock::MockCache;
