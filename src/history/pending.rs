//! Pending Transfer Set
//!
//! Transfers submitted from this client that the indexer has not reported
//! yet. Survives restarts through a `PendingStore`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::HistoryError;
use super::types::HistoryRecord;

pub const PENDING_SET_VERSION: u32 = 1;

/// Key a pending record is tracked under
///
/// The message id when known, the submission hash otherwise. Case is folded
/// so hex hashes from different sources compare equal.
pub fn pending_key(record: &HistoryRecord) -> String {
    if record.has_id() {
        record.id.to_ascii_lowercase()
    } else {
        record.source.submission.hash().to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransferSet {
    version: u32,
    transfers: Vec<HistoryRecord>,
}

impl Default for PendingTransferSet {
    fn default() -> Self {
        Self {
            version: PENDING_SET_VERSION,
            transfers: Vec::new(),
        }
    }
}

impl PendingTransferSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.add(record);
        }
        set
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Most recent first
    pub fn transfers(&self) -> &[HistoryRecord] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.transfers.iter().any(|r| pending_key(r) == key)
    }

    /// Insert at the front, replacing any record tracked under the same key
    pub fn add(&mut self, record: HistoryRecord) {
        let key = pending_key(&record);
        self.transfers.retain(|r| pending_key(r) != key);
        self.transfers.insert(0, record);
    }

    /// Remove every record tracked under one of `keys`, returning how many went
    pub fn remove_keys(&mut self, keys: &[String]) -> usize {
        let before = self.transfers.len();
        self.transfers
            .retain(|r| !keys.iter().any(|k| *k == pending_key(r)));
        before - self.transfers.len()
    }
}

/// Durable storage for the pending set
#[async_trait]
pub trait PendingStore: Send + Sync {
    async fn load(&self) -> Result<PendingTransferSet, HistoryError>;

    async fn save(&self, set: &PendingTransferSet) -> Result<(), HistoryError>;
}

/// JSON document on disk, replaced atomically on every save
pub struct JsonFilePendingStore {
    path: PathBuf,
}

impl JsonFilePendingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PendingStore for JsonFilePendingStore {
    async fn load(&self) -> Result<PendingTransferSet, HistoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No pending store yet, starting empty");
                return Ok(PendingTransferSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let set: PendingTransferSet = serde_json::from_slice(&bytes)?;
        if set.version != PENDING_SET_VERSION {
            return Err(HistoryError::UnsupportedVersion(set.version));
        }

        info!(path = %self.path.display(), transfers = set.len(), "Pending transfers loaded");
        Ok(set)
    }

    async fn save(&self, set: &PendingTransferSet) -> Result<(), HistoryError> {
        let json = serde_json::to_vec_pretty(set)?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Write-then-rename so a crash never leaves a torn document
        let tmp = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), transfers = set.len(), "Pending transfers saved");
        Ok(())
    }
}

/// In-process store, used by tests and when no path is configured
#[derive(Default)]
pub struct MemoryPendingStore {
    inner: Mutex<PendingTransferSet>,
}

impl MemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(set: PendingTransferSet) -> Self {
        Self {
            inner: Mutex::new(set),
        }
    }

    pub fn snapshot(&self) -> PendingTransferSet {
        self.inner
            .lock()
            .map(|g| g.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl PendingStore for MemoryPendingStore {
    async fn load(&self) -> Result<PendingTransferSet, HistoryError> {
        Ok(self.snapshot())
    }

    async fn save(&self, set: &PendingTransferSet) -> Result<(), HistoryError> {
        match self.inner.lock() {
            Ok(mut guard) => *guard = set.clone(),
            Err(poisoned) => *poisoned.into_inner() = set.clone(),
        }
        Ok(())
    }
}
