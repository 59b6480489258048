//! Secure credential store capability
//!
//! The PIN gate only needs keyed get/set/delete of short strings. The storage
//! medium is up to the implementation:
//! - [`MemoryStore`]: process-local map for tests and demos
//! - [`FileStore`]: keyed JSON document with owner-only permissions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::StoreError;

/// Keyed secret storage, atomic per key
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key` if present
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Whether a non-empty value is stored under `key`
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some_and(|value| !value.is_empty()))
    }
}
