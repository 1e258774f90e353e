//! Backup export and import flows

use crate::schema::validate_document;
use crate::{BackupError, ExportOutcome, ImportOutcome};
use cnr_config::LauncherConfig;
use cnr_storage::{RecordStore, StorageError, copy_tree};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the store document inside an exported backup
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Media folder name inside a backup
pub const UPLOADS_FOLDER_NAME: &str = "uploads";

/// Why a directory is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    /// Destination folder for a new backup
    Export,
    /// Backup folder to restore from
    Import,
}

/// Asks the user for a directory; `None` means the prompt was dismissed
pub trait DirectoryPrompt {
    fn select_directory(&self, purpose: PromptPurpose) -> Option<PathBuf>;
}

/// Prompt answered up front, e.g. by a path carried in a request
#[derive(Debug, Clone, Default)]
pub struct FixedDirectory(pub Option<PathBuf>);

impl DirectoryPrompt for FixedDirectory {
    fn select_directory(&self, _purpose: PromptPurpose) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Restarts the application after a restore
pub trait Relauncher {
    fn relaunch(&self) -> std::io::Result<()>;
}

/// Exports the record store and uploads to a folder and restores them
pub struct BackupService {
    store: Arc<RecordStore>,
    uploads_dir: PathBuf,
    backup_dir_name: String,
}

impl BackupService {
    pub fn new(
        store: Arc<RecordStore>,
        uploads_dir: impl Into<PathBuf>,
        backup_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            uploads_dir: uploads_dir.into(),
            backup_dir_name: backup_dir_name.into(),
        }
    }

    pub fn from_config(store: Arc<RecordStore>, config: &LauncherConfig) -> Self {
        Self::new(store, config.uploads_path(), config.backup_dir_name.clone())
    }

    /// Export the store and uploads into `<chosen dir>/<backup dir name>`
    pub async fn export(&self, prompt: &dyn DirectoryPrompt) -> Result<ExportOutcome, BackupError> {
        let Some(destination) = prompt.select_directory(PromptPurpose::Export) else {
            return Ok(ExportOutcome::Canceled);
        };

        match self.export_to(&destination).await {
            Ok(backup_dir) => {
                tracing::info!("App data exported to {}", backup_dir.display());
                Ok(ExportOutcome::Completed)
            }
            Err(e) => {
                tracing::error!("App data exporting error: {}", e);
                Err(BackupError::ExportFailed(e))
            }
        }
    }

    /// Write the backup folder under `destination`, returning its path
    pub async fn export_to(&self, destination: &Path) -> Result<PathBuf, StorageError> {
        let backup_dir = destination.join(&self.backup_dir_name);
        tokio::fs::create_dir_all(&backup_dir).await?;

        let document = self.store.document().await;
        tokio::fs::write(backup_dir.join(CONFIG_FILE_NAME), to_pretty_json(&document)?).await?;

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        copy_tree(self.uploads_dir.clone(), backup_dir.join(UPLOADS_FOLDER_NAME)).await?;

        Ok(backup_dir)
    }

    /// Restore from a chosen backup folder and relaunch on success
    pub async fn import(
        &self,
        prompt: &dyn DirectoryPrompt,
        relauncher: &dyn Relauncher,
    ) -> Result<ImportOutcome, BackupError> {
        let Some(backup_dir) = prompt.select_directory(PromptPurpose::Import) else {
            return Ok(ImportOutcome::Canceled);
        };

        let outcome = self.import_from(&backup_dir).await?;

        if outcome == ImportOutcome::Restored {
            relauncher.relaunch().map_err(|e| {
                tracing::error!("Relaunch after restore failed: {}", e);
                BackupError::ImportFailed(e.into())
            })?;
        }

        Ok(outcome)
    }

    /// Validate and restore the backup in `backup_dir` without relaunching
    pub async fn import_from(&self, backup_dir: &Path) -> Result<ImportOutcome, BackupError> {
        let fail = |e: StorageError| {
            tracing::error!("App Data Importing Process Failed: {}", e);
            BackupError::ImportFailed(e)
        };

        let Some(config_path) = find_config_file(backup_dir).await.map_err(fail)? else {
            tracing::error!("No JSON file found in {}", backup_dir.display());
            return Ok(ImportOutcome::IncorrectFile);
        };

        let contents = tokio::fs::read(&config_path)
            .await
            .map_err(|e| fail(e.into()))?;

        // Invalid UTF-8 is a syntax error like any other
        let document: Value = match serde_json::from_slice(&contents) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(
                    "JSON syntax error in config file {}: {}",
                    config_path.display(),
                    e
                );
                return Ok(ImportOutcome::IncorrectFile);
            }
        };

        let summary = match validate_document(&document) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Imported app data schema validation failed: {}", e);
                return Ok(ImportOutcome::IncorrectFile);
            }
        };

        let Value::Object(entries) = document else {
            return Ok(ImportOutcome::IncorrectFile);
        };

        self.store.clear().await.map_err(fail)?;
        self.store.set_document(entries).await.map_err(fail)?;
        tracing::info!(
            games = summary.games,
            collections = summary.collections,
            "App data imported from {}",
            config_path.display()
        );

        self.restore_uploads(&backup_dir.join(UPLOADS_FOLDER_NAME)).await;

        Ok(ImportOutcome::Restored)
    }

    /// Replace the uploads directory with the backup's copy
    ///
    /// Non-fatal: a missing or unreadable backup folder only logs a warning.
    async fn restore_uploads(&self, backup_uploads: &Path) {
        let is_dir = tokio::fs::metadata(backup_uploads)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        if !is_dir {
            tracing::warn!(
                "Backup uploads folder ({}) not found or accessible. Skipping media restore.",
                UPLOADS_FOLDER_NAME
            );
            if let Err(e) = tokio::fs::create_dir_all(&self.uploads_dir).await {
                tracing::warn!("Could not create uploads folder: {}", e);
            }
            return;
        }

        match self.replace_uploads(backup_uploads).await {
            Ok(copied) => tracing::info!("Uploads folder restored ({} files)", copied),
            Err(e) => tracing::warn!(
                "Backup uploads folder ({}) not restored: {}. Skipping media restore.",
                UPLOADS_FOLDER_NAME,
                e
            ),
        }
    }

    async fn replace_uploads(&self, backup_uploads: &Path) -> Result<u64, StorageError> {
        if tokio::fs::try_exists(&self.uploads_dir).await? {
            tokio::fs::remove_dir_all(&self.uploads_dir).await?;
        }
        tokio::fs::create_dir_all(&self.uploads_dir).await?;

        copy_tree(backup_uploads.to_path_buf(), self.uploads_dir.clone()).await
    }
}

/// First `*.json` file in `dir`, by file name
async fn find_config_file(dir: &Path) -> Result<Option<PathBuf>, StorageError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json && entry.file_type().await?.is_file() {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.into_iter().next())
}

fn to_pretty_json(value: &Value) -> Result<Vec<u8>, StorageError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}
