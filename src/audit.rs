use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Audit-log collaborator, shared with the compiler through an `Arc`.
///
/// Only the init lifecycle is modelled here: after every successful parse
/// pass the compiler calls [`AuditLog::init`], which verifies the sink is
/// usable. Event formatting and writing live outside this crate.
#[derive(Debug, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
    ready: AtomicBool,
}

impl AuditLog {
    /// An audit log with no sink configured. `init` always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An audit log appending to the file at `path`.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ready: AtomicBool::new(false),
        }
    }

    /// The configured sink path, when any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Verifies the sink is usable. Idempotent: once a call has succeeded,
    /// later calls return without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Propagates the I/O error when the sink file cannot be created or
    /// opened for append.
    pub fn init(&self) -> io::Result<()> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }
        if let Some(path) = &self.path {
            OpenOptions::new().create(true).append(true).open(path)?;
        }
        self.ready.store(true, Ordering::Release);
        debug!(path = ?self.path, "audit log ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_without_a_sink_succeeds() {
        assert!(AuditLog::new().init().is_ok());
    }

    #[test]
    fn init_creates_the_sink_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = AuditLog::with_path(&path);
        log.init().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn init_fails_when_the_sink_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::with_path(dir.path().join("missing").join("audit.log"));
        assert!(log.init().is_err());
    }

    #[test]
    fn init_short_circuits_once_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = AuditLog::with_path(&path);
        log.init().unwrap();

        // The sink vanishing after a successful init is not re-detected.
        std::fs::remove_file(&path).unwrap();
        assert!(log.init().is_ok());
    }
}
