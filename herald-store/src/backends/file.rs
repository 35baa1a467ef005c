use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use herald_common::CampaignRecord;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::{
    StoreError,
    error::ValidationError,
    r#trait::{CampaignStore, Transaction, TransactionFn, TransactionOutcome, UpdateFn},
    types::CampaignId,
};

/// File-based campaign store
///
/// Stores each campaign as a JSON document named by its ULID:
/// `{campaign_id}.json`. The ID encodes both timestamp and randomness,
/// ensuring global uniqueness and lexicographic sortability.
///
/// # Security
/// - Uses atomic writes (write to temp file, then rename) to prevent corruption
/// - Validates all filename components to prevent path traversal
/// - Only reads files matching the expected naming pattern (valid ULIDs)
///
/// # Atomicity
/// All write operations use the "write to temp, then rename" pattern so
/// that partial writes never leave the store in an inconsistent state.
/// Transactions and updates additionally serialise through a store-wide
/// async mutex, so the read-modify-write of a checkpoint cannot
/// interleave with another transaction or an external status write on
/// the same store.
#[derive(Debug, Clone)]
pub struct FileCampaignStore {
    path: PathBuf,
    txn_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Default for FileCampaignStore {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/herald/campaigns"),
            txn_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

// Custom Deserialize implementation with path validation
impl<'de> Deserialize<'de> for FileCampaignStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct FileCampaignStoreHelper {
            path: PathBuf,
        }

        let helper = FileCampaignStoreHelper::deserialize(deserializer)?;
        Self::validate_path(&helper.path).map_err(serde::de::Error::custom)?;

        Ok(Self {
            path: helper.path,
            txn_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }
}

impl FileCampaignStore {
    /// Validate a store path for security
    ///
    /// # Security Checks
    /// - Rejects paths containing `..` (directory traversal)
    /// - Rejects paths to sensitive system directories
    /// - Ensures the path is absolute
    ///
    /// # Errors
    /// Returns an error if the path is invalid or potentially dangerous
    fn validate_path(path: &Path) -> Result<(), ValidationError> {
        for component in path.components() {
            if component == std::path::Component::ParentDir {
                return Err(ValidationError::UnsafePath(format!(
                    "path cannot contain '..' components: {}",
                    path.display()
                )));
            }
        }

        if !path.is_absolute() {
            return Err(ValidationError::UnsafePath(format!(
                "path must be absolute: {}",
                path.display()
            )));
        }

        let sensitive_prefixes = [
            "/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc", "/dev",
        ];

        for prefix in &sensitive_prefixes {
            if path.starts_with(prefix) {
                return Err(ValidationError::UnsafePath(format!(
                    "path cannot be in system directory {prefix}: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Create a new `FileCampaignStore` builder
    #[must_use]
    pub fn builder() -> FileCampaignStoreBuilder {
        FileCampaignStoreBuilder::default()
    }

    /// The directory holding campaign documents.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initialize the file-backed store
    ///
    /// Creates the store directory if it doesn't exist and validates that
    /// the path is actually a directory. Also cleans up any orphaned
    /// `.deleted` files from previous crashes.
    ///
    /// # Errors
    /// - If the store path cannot be created
    /// - If the path exists but is not a directory
    pub fn init(&self) -> crate::Result<()> {
        debug!(path = %self.path.display(), "Initialising campaign store");

        if self.path.try_exists()? {
            if !self.path.is_dir() {
                return Err(
                    ValidationError::NotDirectory(self.path.display().to_string()).into(),
                );
            }
        } else {
            std::fs::create_dir_all(&self.path)?;
        }

        self.cleanup_deleted_files()?;

        Ok(())
    }

    /// Clean up orphaned `.deleted` files from incomplete delete operations
    ///
    /// Called during `init()` to remove any files that were renamed to the
    /// `.deleted` suffix but not removed due to a crash.
    fn cleanup_deleted_files(&self) -> crate::Result<()> {
        let entries = std::fs::read_dir(&self.path)?;
        let mut cleaned = 0;

        for entry in entries {
            let entry = entry?;
            let filename = entry.file_name();

            if filename.to_string_lossy().ends_with(".deleted") {
                std::fs::remove_file(entry.path())?;
                cleaned += 1;
            }
        }

        if cleaned > 0 {
            debug!(cleaned, "Cleaned up orphaned .deleted files from store");
        }

        Ok(())
    }

    fn document_path(&self, id: &CampaignId) -> PathBuf {
        self.path.join(format!("{id}.json"))
    }

    async fn read_document(&self, id: &CampaignId) -> crate::Result<CampaignRecord> {
        let path = self.document_path(id);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&content)?)
    }

    /// Write a document atomically: write to a temp file, then rename.
    ///
    /// The temp name carries a fresh ULID so two writers flushing the
    /// same record can never collide on it. If the process crashes
    /// mid-write, the temporary file is ignored by `list()` and the
    /// previous document remains intact.
    async fn write_document(&self, id: &CampaignId, record: &CampaignRecord) -> crate::Result<()> {
        let filename = format!("{id}.json");
        let path = self.path.join(&filename);
        let temp_path = self
            .path
            .join(format!(".tmp_{}_{filename}", ulid::Ulid::new()));

        let content = serde_json::to_vec_pretty(record)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}

#[async_trait]
impl CampaignStore for FileCampaignStore {
    /// Create a campaign document on disk and return its generated ID
    async fn create(&self, record: &CampaignRecord) -> crate::Result<CampaignId> {
        let id = CampaignId::generate();
        let path = self.document_path(&id);

        // ULID collision would silently overwrite another campaign
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::AlreadyExists(id));
        }

        self.write_document(&id, record).await?;

        debug!(campaign = %id, path = %path.display(), "Created campaign document");

        Ok(id)
    }

    async fn get(&self, id: &CampaignId) -> crate::Result<CampaignRecord> {
        self.read_document(id).await
    }

    async fn update(&self, id: &CampaignId, apply: UpdateFn) -> crate::Result<()> {
        // An unserialised status write racing a checkpoint transaction
        // could write back a stale record; the guard spans read and write
        let _guard = self.txn_lock.lock().await;

        let mut record = self.read_document(id).await?;
        apply(&mut record);
        self.write_document(id, &record).await
    }

    async fn transaction(
        &self,
        id: &CampaignId,
        apply: TransactionFn,
    ) -> crate::Result<TransactionOutcome> {
        // Serialise with updates store-wide; the guard spans read and write
        let _guard = self.txn_lock.lock().await;

        let stored = self.read_document(id).await?;
        let mut candidate = stored.clone();

        match apply(&mut candidate) {
            Transaction::Commit => {
                self.write_document(id, &candidate).await?;
                Ok(TransactionOutcome::Committed(candidate))
            }
            Transaction::Abort => Ok(TransactionOutcome::Aborted(stored)),
        }
    }

    /// List all campaign documents in the store directory
    ///
    /// Scans for `.json` documents and parses their filenames into IDs.
    /// Results are sorted lexicographically by ULID (creation time).
    /// Temporary (`.tmp_`) and half-deleted (`.deleted`) files are
    /// ignored.
    async fn list(&self) -> crate::Result<Vec<CampaignId>> {
        let mut entries = fs::read_dir(&self.path).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name();
            let filename_str = filename.to_string_lossy();

            if filename_str.ends_with(".json")
                && !filename_str.starts_with(".tmp_")
                && let Some(id) = CampaignId::from_filename(&filename_str)
            {
                ids.push(id);
            }
        }

        ids.sort();

        Ok(ids)
    }

    /// Delete a campaign document
    ///
    /// Uses a two-phase delete to prevent a half-removed document from
    /// being observed: rename to the `.deleted` suffix, then remove. If
    /// the process crashes between the phases, the `.deleted` file is
    /// ignored by `list()` and cleaned up on the next `init()`.
    async fn delete(&self, id: &CampaignId) -> crate::Result<()> {
        let filename = format!("{id}.json");
        let path = self.path.join(&filename);
        let deleted_path = self.path.join(format!("{filename}.deleted"));

        match fs::rename(&path, &deleted_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        fs::remove_file(&deleted_path).await?;

        debug!(campaign = %id, "Deleted campaign document");

        Ok(())
    }
}

/// Builder for `FileCampaignStore`
#[derive(Debug, Default)]
pub struct FileCampaignStoreBuilder {
    path: PathBuf,
}

impl FileCampaignStoreBuilder {
    /// Set the store directory path
    #[must_use]
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Build the final `FileCampaignStore`
    ///
    /// # Errors
    /// Returns an error if the path is invalid or potentially dangerous
    pub fn build(self) -> crate::Result<FileCampaignStore> {
        FileCampaignStore::validate_path(&self.path)?;
        Ok(FileCampaignStore {
            path: self.path,
            txn_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }
}
