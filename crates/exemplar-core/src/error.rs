//! Unified error types for the exemplar toolkit.
//!
//! Most variants are planning errors: raised before any filesystem mutation, so
//! the caller can retry or abort with nothing to clean up. `ApplyFailure` is only
//! raised by the injection engine after its rollback sequence has already run.
//! `Io` and `Other` are unclassified (build mode can raise them mid-write).

use std::path::PathBuf;
use thiserror::Error;

use crate::transaction::RollbackReport;

/// All errors that can occur during exemplar operations.
#[derive(Error, Debug)]
pub enum ExemplarError {
    // --- Configuration ---

    /// A configuration or catalog file was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or catalog file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Catalog ---

    /// The requested example or category id is not in the catalog.
    #[error("unknown {kind} '{id}' (available: {})", .available.join(", "))]
    UnknownIdentifier {
        kind: &'static str,
        id: String,
        available: Vec<String>,
    },

    /// The catalog is structurally broken (duplicate ids, empty or dangling categories).
    #[error("catalog integrity error: {0}")]
    CatalogIntegrity(String),

    /// A path declared by a manifest entry does not exist.
    #[error("source file declared by the catalog does not exist: {0}")]
    MissingSourceFile(PathBuf),

    /// Two different sources resolve to the same destination path.
    #[error("destination {destination} is claimed by both {first} and {second}")]
    DestinationCollision {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// An input file (asset source or target manifest) exists but could not be read.
    #[error("failed to read {}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Build mode ---

    /// Attempted to compose a project into a directory that already exists.
    #[error("target directory already exists: {0}")]
    TargetAlreadyExists(PathBuf),

    /// The target directory would be created inside the base template it is copied from.
    #[error("target {} is inside the base template {}", .target.display(), .template.display())]
    TargetInsideTemplate { target: PathBuf, template: PathBuf },

    /// Handlebars template rendering failed (invalid template or missing variables).
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    // --- Inject mode ---

    /// The target directory is missing one or more framework marker files.
    #[error("{} is not a {framework} project (missing: {})", .path.display(), display_paths(.missing))]
    NotATargetProject {
        path: PathBuf,
        framework: &'static str,
        missing: Vec<PathBuf>,
    },

    /// The target project's package manifest is not valid JSON (or not an object).
    #[error("failed to parse package manifest at {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    /// The conflict decision source failed (e.g. the interactive prompt was closed).
    #[error("conflict decision failed for {path}: {reason}")]
    Prompt { path: PathBuf, reason: String },

    /// A filesystem operation failed while applying an injection. The rollback
    /// sequence has already run; `rollback` says how completely it restored the tree.
    #[error("failed to {operation} {}{}", .path.display(), rollback_suffix(.rollback))]
    ApplyFailure {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
        rollback: RollbackReport,
    },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExemplarError {
    /// True for errors raised before any filesystem mutation took place. `Io` and
    /// `Other` may come from either phase and count as false.
    pub fn is_planning_error(&self) -> bool {
        !matches!(self, Self::ApplyFailure { .. } | Self::Io(_) | Self::Other(_))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn rollback_suffix(report: &RollbackReport) -> String {
    if report.is_complete() {
        " (changes rolled back)".to_string()
    } else {
        format!(
            " (rollback incomplete: {} path(s) could not be restored)",
            report.failures.len()
        )
    }
}

/// Alias for `Result<T, ExemplarError>`.
pub type Result<T> = std::result::Result<T, ExemplarError>;
