//! Repository decorators used on the redirect path.

pub mod cached;

pub use cached::CachedRepository;
