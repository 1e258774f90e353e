//! Uploaded media (game icons)

use crate::StorageError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Component, Path, PathBuf};

/// URI scheme used to reference files in the uploads directory
pub const IMAGE_SCHEME: &str = "app-image";

/// Stores uploaded images and maps `app-image://` URIs back to files
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The uploads directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the uploads directory if it does not exist
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Decode a base64 image (optionally a `data:image/*;base64,` URL) and store it as PNG
    ///
    /// Returns the `app-image://` URI of the stored file.
    pub async fn save_image(&self, image_data: &str) -> Result<String, StorageError> {
        let bytes = STANDARD
            .decode(strip_data_url(image_data).trim())
            .map_err(|e| StorageError::InvalidImage(e.to_string()))?;

        if bytes.is_empty() {
            return Err(StorageError::InvalidImage("empty image".into()));
        }

        self.ensure_dir().await?;

        let stamp = chrono::Utc::now().timestamp_millis();
        let mut file_name = format!("{}.png", stamp);
        let mut suffix = 1;
        while tokio::fs::try_exists(self.root.join(&file_name)).await? {
            file_name = format!("{}-{}.png", stamp, suffix);
            suffix += 1;
        }

        let path = self.root.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("Image saved to {}", path.display());

        Ok(format!("{}://{}", IMAGE_SCHEME, file_name))
    }

    /// Map an `app-image://` URI to its file in the uploads directory
    pub fn resolve(&self, uri: &str) -> Result<PathBuf, StorageError> {
        let relative = uri
            .strip_prefix(IMAGE_SCHEME)
            .and_then(|rest| rest.strip_prefix("://"))
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| StorageError::InvalidMediaUri(uri.to_string()))?;

        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidMediaUri(uri.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Delete the files behind `uris`, skipping `None` entries
    ///
    /// Every file is attempted; failures are logged and reported together.
    pub async fn delete_images<'a, I>(&self, uris: I) -> Result<usize, StorageError>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut deleted = 0;
        let mut failures = Vec::new();

        for uri in uris.into_iter().flatten() {
            let result = match self.resolve(uri) {
                Ok(path) => tokio::fs::remove_file(&path).await.map_err(StorageError::from),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!("Failed to delete image {}: {}", uri, e);
                    failures.push(format!("{}: {}", uri, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(StorageError::MediaDelete(failures.join("; ")));
        }

        tracing::info!("Deleted {} images", deleted);
        Ok(deleted)
    }
}

fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:image/") {
        if let Some(index) = data.find(";base64,") {
            return &data[index + ";base64,".len()..];
        }
    }
    data
}
