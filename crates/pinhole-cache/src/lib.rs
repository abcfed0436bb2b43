//! Cache trait and the in-memory implementation used by the redirector.

pub mod cache;
pub mod error;
pub mod moka;

pub use cache::UrlCache;
pub use error::{CacheError, Result};
pub use self::moka::{CacheConfig, MokaUrlCache};
