//! # Request Artifacts
//!
//! Filesystem bookkeeping for a single encode/decode request.
//!
//! Every path a request creates or is handed (uploaded input, temporary
//! output, delivered output) is registered with a [`RequestArtifacts`] guard.
//! When the guard drops, on success, on error or during unwinding, each
//! registered path is deleted. Cleanup failures are logged and never turned
//! into errors, so they cannot mask the real outcome of the request.
//!
//! Temporary names are keyed on the request's UUID, never on the clock, so
//! concurrent requests cannot collide.

use log::{debug, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Cleanup guard for the files belonging to one request.
#[derive(Debug)]
pub struct RequestArtifacts {
    request_id: Uuid,
    tracked: Vec<PathBuf>,
}

impl RequestArtifacts {
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            tracked: Vec::new(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Register a path for removal when the request ends.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.tracked.push(path.into());
    }

    /// Stop tracking `path` (it has been moved somewhere the caller owns).
    pub fn release(&mut self, path: &Path) {
        self.tracked.retain(|p| p != path);
    }

    /// Reserve and track a temporary sibling of `destination`.
    ///
    /// The name is `<destination file name>.<request id>.tmp` in the same
    /// directory, so the final rename stays on one filesystem.
    pub fn temp_path_for(&mut self, destination: &Path) -> PathBuf {
        let file_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let temp = destination.with_file_name(format!("{}.{}.tmp", file_name, self.request_id));
        self.track(temp.clone());
        temp
    }
}

impl Drop for RequestArtifacts {
    fn drop(&mut self) {
        for path in self.tracked.drain(..) {
            safe_delete(&path);
        }
    }
}

/// Remove a file, ignoring "not found" and logging anything else.
pub fn safe_delete(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("🧹 Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("⚠️  Error cleaning up {}: {}", path.display(), e),
    }
}

/// Write `bytes` to `path` and flush them to stable storage.
pub fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
