//! Vitrine storage gateway
//!
//! One interface over the places entity rows can live:
//! - Hosted relational store reached over its REST contract
//! - Local persistent key-value store (one JSON array per entity kind)
//! - In-memory store (tests and throwaway instances)
//!
//! The backend is chosen once from a [`StorageConfig`] at the composition root
//! and shared as `Arc<dyn StorageBackend>`.

mod config;
mod helper;
mod traits;

pub mod hosted;
pub mod local;
pub mod memory;

pub use config::{HostedConfig, LocalConfig, StorageConfig, StorageProvider, create_backend};
pub use hosted::HostedStore;
pub use local::LocalStore;
pub use memory::InMemoryStore;
pub use traits::{EntityKind, StorageBackend, StorageError, StorageResult};
pub use vitrine_types::Record;
