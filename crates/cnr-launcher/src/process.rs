//! Starting games and restarting the launcher

use cnr_backup::Relauncher;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Starts a game executable
pub trait GameSpawner: Send + Sync {
    /// Start `path` and return its process id without waiting for it
    fn spawn(&self, path: &Path) -> io::Result<u32>;
}

/// Spawns games as detached child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl GameSpawner for SystemSpawner {
    fn spawn(&self, path: &Path) -> io::Result<u32> {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Executable not found: {}", path.display()),
            ));
        }

        let mut cmd = Command::new(path);
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        // Games must not read from or write into the response stream
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        tracing::info!("Launching {}", path.display());
        let child = cmd.spawn()?;
        Ok(child.id())
    }
}

/// Restarts the current executable with the same arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRelauncher;

impl Relauncher for ProcessRelauncher {
    fn relaunch(&self) -> io::Result<()> {
        let exe = std::env::current_exe()?;
        let child = Command::new(&exe).args(std::env::args_os().skip(1)).spawn()?;
        tracing::info!("Relaunched {} as pid {}", exe.display(), child.id());
        Ok(())
    }
}
