//! URL shortener service implementation.
//!
//! This crate owns the create path: validate the long URL, draw candidate
//! codes from a [`Generator`](pinhole_generator::Generator) and commit them
//! through the repository's atomic `put_if_absent`, retrying on collision.

pub mod error;
pub mod service;
pub mod shortener;
pub mod validate;

pub use error::ShortenerError;
pub use service::{ShortenerService, ShortenerSettings};
pub use shortener::{Shortened, Shortener};
