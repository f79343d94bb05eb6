use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// A non-fatal finding returned alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Two examples asked for different versions of one dependency. The first
    /// version seen wins.
    DependencyVersionConflict {
        name: String,
        kept: String,
        ignored: String,
        example: String,
    },
    /// No declared symbol was found in a primary source; its file stem was used.
    SymbolFallback { source: PathBuf, used: String },
    /// Injection changed the version of a dependency the target already declared.
    DependencyUpdated {
        name: String,
        previous: String,
        current: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependencyVersionConflict {
                name,
                kept,
                ignored,
                example,
            } => write!(
                f,
                "dependency '{name}': keeping {kept}, ignoring {ignored} requested by '{example}'"
            ),
            Self::SymbolFallback { source, used } => write!(
                f,
                "no declared symbol in {}, using file name '{used}'",
                source.display()
            ),
            Self::DependencyUpdated {
                name,
                previous,
                current,
            } => write!(f, "dependency '{name}' updated from {previous} to {current}"),
        }
    }
}
