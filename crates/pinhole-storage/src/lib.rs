//! Mapping store backends.
//!
//! Both backends implement [`Repository`] with an atomic
//! `put_if_absent`, which is the only synchronization point the
//! shortener relies on to keep codes unique.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use pinhole_core::{ReadRepository, Repository, StorageError};
pub use sqlite::SqliteRepository;
