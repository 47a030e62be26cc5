//! Durable string key/value storage used by the client buffer module.
//!
//! The relay gives each module instance one flat namespace of string keys and
//! string values. [`KeyValueStore`] is that contract; [`MemoryStore`] and
//! [`JsonFileStore`] are the two providers shipped here.
//!
//! Keys enumerate in sorted order, which is the order the relay's own module
//! registry uses, so listings are stable across restarts.

use thiserror::Error;

mod memory;
pub use memory::MemoryStore;

mod jsonfile;
pub use jsonfile::JsonFileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid store data: {0}")]
    InvalidData(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Trait defining a key/value storage provider
///
/// Methods take `&self`; providers serialise their own mutations. A store
/// instance belongs to exactly one module instance and is never shared
/// between relay users.
pub trait KeyValueStore {
    /// Retrieve the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns whether the key was present.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All keys currently stored, in sorted order
    fn keys(&self) -> Result<Vec<String>>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All keys beginning with `prefix`, in sorted order
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }
}
