//! JSON document key-value store

use crate::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Durable key-value store backed by a single JSON file
///
/// Keys are dot-paths: `user.preferences` addresses
/// `{"user": {"preferences": ...}}`. The whole document is kept in memory and
/// flushed to disk after every mutation, while the document lock is held.
pub struct RecordStore {
    path: PathBuf,
    document: Mutex<Map<String, Value>>,
}

impl RecordStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => map,
                _ => return Err(StorageError::InvalidDocument(path)),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No record store at {}, starting empty", path.display());
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw value stored under `key`
    pub async fn get(&self, key: &str) -> Option<Value> {
        let document = self.document.lock().await;
        lookup(&document, key).cloned()
    }

    /// Value stored under `key`, decoded into `T`
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key).await {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StorageError::Decode {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    /// Replace the value under `key` and persist the document
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        let mut document = self.document.lock().await;
        insert(&mut document, key, value);
        self.flush(&document).await
    }

    /// Read-modify-write the value under `key` while holding the document lock
    ///
    /// A missing key starts from `T::default()`. When `f` returns `None` the
    /// document is left untouched and nothing is written.
    pub async fn update_with<T, R, F>(&self, key: &str, f: F) -> Result<Option<R>, StorageError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> Option<R>,
    {
        let mut document = self.document.lock().await;

        let mut current: T = match lookup(&document, key) {
            None | Some(Value::Null) => T::default(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|source| {
                StorageError::Decode {
                    key: key.to_string(),
                    source,
                }
            })?,
        };

        let Some(result) = f(&mut current) else {
            return Ok(None);
        };

        insert(&mut document, key, serde_json::to_value(&current)?);
        self.flush(&document).await?;

        Ok(Some(result))
    }

    /// Merge every top-level entry of `entries` into the document and persist
    pub async fn set_document(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        let mut document = self.document.lock().await;
        for (key, value) in entries {
            document.insert(key, value);
        }
        self.flush(&document).await
    }

    /// Remove every key and persist the empty document
    pub async fn clear(&self) -> Result<(), StorageError> {
        let mut document = self.document.lock().await;
        document.clear();
        self.flush(&document).await
    }

    /// Snapshot of the whole document
    pub async fn document(&self) -> Value {
        Value::Object(self.document.lock().await.clone())
    }

    async fn flush(&self, document: &Map<String, Value>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, contents).await?;
        tracing::debug!("Record store flushed to {}", self.path.display());
        Ok(())
    }
}

fn lookup<'a>(document: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    Some(current)
}

fn insert(document: &mut Map<String, Value>, key: &str, value: Value) {
    let segments: Vec<&str> = key.split('.').collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = document;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }

        current = match entry {
            Value::Object(map) => map,
            _ => unreachable!("entry was just replaced with an object"),
        };
    }

    current.insert(last.to_string(), value);
}
