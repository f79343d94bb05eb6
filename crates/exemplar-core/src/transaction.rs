//! In-memory transaction log for a single injection run.
//!
//! Every mutation the injection engine applies is recorded here the instant it
//! succeeds. On commit the log is discarded; on failure it is replayed in strict
//! reverse order. The log is never persisted, so a process crash mid-run is not
//! recoverable from it.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Final state of an injection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectionState {
    Planning,
    Applying,
    Committed,
    RollingBack,
    RolledBack,
}

impl InjectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Applying => "applying",
            Self::Committed => "committed",
            Self::RollingBack => "rolling-back",
            Self::RolledBack => "rolled-back",
        }
    }
}

/// One applied mutation plus what is needed to reverse it.
#[derive(Debug, Clone)]
pub enum TransactionRecord {
    /// A file that did not exist before the run. Deleted on rollback.
    Created { path: PathBuf },
    /// A file that existed before the run. Its original bytes are restored on rollback.
    Overwritten { path: PathBuf, original: Vec<u8> },
    /// A directory created to hold new files. Removed on rollback if empty.
    CreatedDir { path: PathBuf },
}

impl TransactionRecord {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created { path } | Self::Overwritten { path, .. } | Self::CreatedDir { path } => {
                path
            }
        }
    }

    fn undo(&self) -> std::io::Result<()> {
        match self {
            Self::Created { path } => match std::fs::remove_file(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            Self::Overwritten { path, original } => std::fs::write(path, original),
            Self::CreatedDir { path } => match std::fs::remove_dir(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        }
    }
}

/// A restore step that could not be completed during rollback.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of replaying a transaction log in reverse.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackReport {
    pub state: InjectionState,
    /// Paths successfully reverted, in the order they were reverted.
    pub restored: Vec<PathBuf>,
    /// Steps that failed. Non-empty means the rollback is incomplete.
    pub failures: Vec<RollbackFailure>,
}

impl RollbackReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered record of reversible operations for one run.
#[derive(Debug, Default)]
pub struct TransactionLog {
    records: Vec<TransactionRecord>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: TransactionRecord) {
        tracing::trace!("transaction record: {:?}", record.path());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard the log. Called once every operation of the run has succeeded.
    pub fn commit(self) -> usize {
        let count = self.records.len();
        tracing::debug!("committing transaction ({count} records)");
        count
    }

    /// Undo every record, last first.
    ///
    /// Best-effort: a failed step is reported and the replay continues with the
    /// remaining records rather than stopping.
    pub fn rollback(self) -> RollbackReport {
        tracing::warn!("rolling back {} recorded operation(s)", self.records.len());

        let mut restored = Vec::new();
        let mut failures = Vec::new();

        for record in self.records.into_iter().rev() {
            match record.undo() {
                Ok(()) => {
                    tracing::debug!("reverted {}", record.path().display());
                    restored.push(record.path().to_path_buf());
                }
                Err(e) => {
                    tracing::warn!("could not revert {}: {e}", record.path().display());
                    failures.push(RollbackFailure {
                        path: record.path().to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        RollbackReport {
            state: InjectionState::RolledBack,
            restored,
            failures,
        }
    }
}
