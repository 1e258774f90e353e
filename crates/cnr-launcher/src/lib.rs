//! CNR game launcher request server
//!
//! Exposes the game library, user preferences, media store and backup
//! service through one typed request/response boundary. The binary reads one
//! JSON request per line on stdin and answers with one JSON response per line
//! on stdout.

mod dispatch;
mod process;
mod request;

pub use dispatch::Dispatcher;
pub use process::{GameSpawner, ProcessRelauncher, SystemSpawner};
pub use request::{Request, Response};

use anyhow::{Context, Result};
use cnr_backup::BackupService;
use cnr_config::LauncherConfig;
use cnr_library::Library;
use cnr_storage::{MediaStore, RecordStore};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Open the store named by `config` and wire the services around it
pub async fn build_dispatcher(
    config: &LauncherConfig,
    spawner: Box<dyn GameSpawner>,
    relauncher: Box<dyn cnr_backup::Relauncher + Send + Sync>,
) -> Result<Dispatcher> {
    let store_path = config.store_path();
    let store = RecordStore::open(&store_path)
        .await
        .with_context(|| format!("Failed to open record store {}", store_path.display()))?;
    let store = Arc::new(store);

    let media = MediaStore::new(config.uploads_path());
    media
        .ensure_dir()
        .await
        .context("Failed to create uploads directory")?;

    let library = Library::new(Arc::clone(&store), media);
    let backup = BackupService::from_config(store, config);

    Ok(Dispatcher::new(library, backup, spawner, relauncher))
}

/// Parse one request line and produce its response
pub async fn handle_line(dispatcher: &Dispatcher, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            tracing::debug!(?request, "Handling request");
            dispatcher.handle(request).await
        }
        Err(e) => {
            tracing::warn!("Malformed request: {}", e);
            Response::error(format!("Malformed request: {}", e))
        }
    }
}

/// Answer requests line by line until the input closes or a restore restarts the process
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(dispatcher, &line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;

        if response.requires_restart() {
            tracing::info!("Backup restored, handing over to the relaunched process");
            break;
        }
    }

    Ok(())
}
