//! Redirector service library with caching support.
//!
//! This crate provides a [`RedirectorService`] that resolves short codes
//! to their original URLs. Caching is added transparently by wrapping the
//! repository in a [`CachedRepository`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pinhole_cache::MokaUrlCache;
//! use pinhole_core::ShortCode;
//! use pinhole_redirector::{CachedRepository, Redirector, RedirectorError, RedirectorService};
//! use pinhole_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = CachedRepository::new(InMemoryRepository::new(), MokaUrlCache::new());
//! let service = RedirectorService::new(Arc::new(repository));
//!
//! let code = ShortCode::new("aZ3dK9")?;
//! match service.resolve(&code).await {
//!     Ok(record) => println!("Redirect to: {}", record.original_url),
//!     Err(RedirectorError::NotFound(_)) => println!("no such link"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod redirector;
pub mod repository;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use repository::CachedRepository;
pub use service::{RedirectorService, RedirectorSettings};
