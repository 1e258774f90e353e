//! Backup export and restore for the CNR game launcher
//!
//! A backup is a folder holding the whole record store as one JSON file plus
//! a copy of the uploads directory:
//!
//! ```text
//! cnr-game-launcher-backup/
//!     config.json
//!     uploads/
//! ```
//!
//! Restores validate the JSON document strictly before anything in the live
//! store is touched, then relaunch the application so no component keeps
//! serving stale state.

mod schema;
mod service;

pub use schema::{DocumentSummary, validate_document};
pub use service::{
    BackupService, CONFIG_FILE_NAME, DirectoryPrompt, FixedDirectory, PromptPurpose, Relauncher,
    UPLOADS_FOLDER_NAME,
};

use cnr_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("App data exporting error")]
    ExportFailed(#[source] StorageError),

    #[error("App Data Importing Process Failed")]
    ImportFailed(#[source] StorageError),
}

/// Result of an export request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportOutcome {
    Completed,
    Canceled,
}

/// Result of an import request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportOutcome {
    /// Store replaced; the application has been asked to relaunch
    #[serde(rename = "restored")]
    Restored,
    #[serde(rename = "canceled")]
    Canceled,
    /// No usable JSON document in the chosen folder
    #[serde(rename = "incorrect file")]
    IncorrectFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_names() {
        assert_eq!(
            serde_json::to_string(&ExportOutcome::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&ImportOutcome::IncorrectFile).unwrap(),
            "\"incorrect file\""
        );
        assert_eq!(
            serde_json::to_string(&ImportOutcome::Canceled).unwrap(),
            "\"canceled\""
        );
    }

    #[test]
    fn test_backup_error_messages_are_generic() {
        let io = || StorageError::Io(std::io::Error::other("disk full"));
        assert_eq!(
            BackupError::ExportFailed(io()).to_string(),
            "App data exporting error"
        );
        assert_eq!(
            BackupError::ImportFailed(io()).to_string(),
            "App Data Importing Process Failed"
        );
    }
}
