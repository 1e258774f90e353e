//! Storage layer for the CNR game launcher
//!
//! Everything the launcher persists lives under one data directory:
//!
//! # Storage Layout
//!
//! - `config.json`: the record store, a single JSON document with the
//!   `games`, `collections` and `user.preferences` keys
//! - `uploads/`: images referenced by games through `app-image://` URIs
//!
//! The record store is read fully at startup and rewritten wholesale on
//! every mutation.

mod media;
mod record_store;
mod tree;

pub use media::{IMAGE_SCHEME, MediaStore};
pub use record_store::RecordStore;
pub use tree::{copy_tree, copy_tree_blocking};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store document is not a JSON object: {0}")]
    InvalidDocument(PathBuf),

    #[error("Stored value under '{key}' has an unexpected shape: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid media URI: {0}")]
    InvalidMediaUri(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Failed to delete media: {0}")]
    MediaDelete(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
