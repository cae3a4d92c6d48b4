//! Vitrine core library
//!
//! Domain models and the business logic that sits on top of the storage
//! gateway:
//! - **`catalog`**: products, categories, favorites and the public catalog query
//! - **`user`**: user profiles, roles, login history and local credentials
//! - **`sales`**: sales-goal entries, the per-channel ranking and the manual sales ledger
//! - **`entity`**: the [`entity::Entity`] trait and typed [`entity::Collection`] access

pub mod catalog;
pub mod entity;
pub mod sales;
pub mod user;

pub use vitrine_storage;
pub use vitrine_types;
