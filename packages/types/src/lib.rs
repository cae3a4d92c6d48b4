pub use async_trait::async_trait;
pub use serde_json::{self as json, Value};

pub mod utils;

pub mod sync {
    pub use tokio::sync::Mutex;
}

/// A raw entity row as exchanged with a storage backend.
pub type Record = serde_json::Map<String, Value>;

pub fn create_id() -> String {
    cuid2::create_id()
}
