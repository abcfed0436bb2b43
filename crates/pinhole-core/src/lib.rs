//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate provides shared types and traits used by the shortener
//! service, the redirector service and the storage backends.

pub mod error;
pub mod repository;
pub mod shortcode;

pub use error::{CoreError, StorageError};
pub use repository::{ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
