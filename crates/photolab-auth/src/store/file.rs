//! File-backed credential store
//!
//! All entries live in one JSON document. Every write replaces the document
//! through a temp file and a rename, so a crash never leaves a half-written
//! entry behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use zeroize::{Zeroize, Zeroizing};

use super::CredentialStore;
use crate::error::StoreError;

/// Store file name
const STORE_FILE_NAME: &str = "secure_store.json";

/// Directory under the platform data dir
const STORE_DIR_NAME: &str = "photo-lab";

/// Current document version
const STORE_VERSION: u32 = 1;

/// On-disk document
#[derive(Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, StoredEntry>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    updated_at: DateTime<Utc>,
}

impl Drop for StoredEntry {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Credential store persisted as a JSON file
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default store location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STORE_DIR_NAME)
            .join(STORE_FILE_NAME)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreDocument, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(e) => return Err(e.into()),
        };

        let document: StoreDocument = serde_json::from_str(&contents)?;
        if document.version > STORE_VERSION {
            return Err(StoreError::Unavailable(format!(
                "unsupported store version {}",
                document.version
            )));
        }
        Ok(document)
    }

    async fn persist(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = Zeroizing::new(serde_json::to_string_pretty(document)?);
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents.as_bytes()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(document
            .entries
            .get(key)
            .map(|entry| Zeroizing::new(entry.value.clone())))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        document.entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
        self.persist(&document).await?;

        tracing::debug!("Stored credential {:?} in {:?}", key, self.path);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        if document.entries.remove(key).is_some() {
            self.persist(&document).await?;
            tracing::debug!("Removed credential {:?} from {:?}", key, self.path);
        }
        Ok(())
    }
}
