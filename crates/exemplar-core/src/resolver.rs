//! Resolves manifest entries into a concrete, deduplicated [`AssetSet`].
//!
//! Resolution is eager: every declared path is checked (and primary sources are
//! read) before anything is returned, so a broken catalog surfaces here and never
//! halfway through writing a project. The result depends only on the entries,
//! the framework, and the asset files themselves.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::catalog::ManifestEntry;
use crate::diagnostic::Diagnostic;
use crate::error::{ExemplarError, Result};
use crate::framework::Framework;

/// What a planned file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRole {
    Contract,
    Test,
    Auxiliary,
    /// Generated deployment script; never part of a resolved [`AssetSet`].
    DeployStub,
}

impl AssetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Test => "test",
            Self::Auxiliary => "auxiliary",
            Self::DeployStub => "deploy_stub",
        }
    }
}

/// One `(source, destination)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAsset {
    /// Example that first introduced this file.
    pub example: String,
    pub role: AssetRole,
    /// Source path (assets root joined with the catalog path).
    pub source: PathBuf,
    /// Destination, relative to the project root.
    pub destination: PathBuf,
}

/// Resolver output: files to place plus merged package dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetSet {
    /// Unique by destination, in resolution order.
    pub files: Vec<PlannedAsset>,
    pub dependencies: BTreeMap<String, String>,
    /// Declared symbols of the primary sources, in resolution order.
    pub symbols: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AssetSet {
    /// Add a file. A destination already present with the same source is a
    /// no-op; with a different source it is a collision.
    pub fn insert(&mut self, asset: PlannedAsset) -> Result<bool> {
        if let Some(existing) = self
            .files
            .iter()
            .find(|f| f.destination == asset.destination)
        {
            if existing.source == asset.source {
                return Ok(false);
            }
            return Err(ExemplarError::DestinationCollision {
                destination: asset.destination,
                first: existing.source.clone(),
                second: asset.source,
            });
        }
        self.files.push(asset);
        Ok(true)
    }

    /// Merge one dependency, keeping the first version seen.
    pub fn add_dependency(&mut self, name: &str, version: &str, example: &str) {
        let kept = match self.dependencies.get(name) {
            None => {
                self.dependencies.insert(name.to_string(), version.to_string());
                return;
            }
            Some(kept) if kept == version => return,
            Some(kept) => kept.clone(),
        };
        tracing::warn!("dependency {name}: keeping {kept}, '{example}' asked for {version}");
        self.push_diagnostic(Diagnostic::DependencyVersionConflict {
            name: name.to_string(),
            kept,
            ignored: version.to_string(),
            example: example.to_string(),
        });
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Union of two sets under the same dedup and collision rules as resolution.
    pub fn union(&self, other: &AssetSet) -> Result<AssetSet> {
        let mut merged = self.clone();
        for file in &other.files {
            merged.insert(file.clone())?;
        }
        for (name, version) in &other.dependencies {
            let example = other
                .files
                .first()
                .map(|f| f.example.as_str())
                .unwrap_or_default();
            merged.add_dependency(name, version, example);
        }
        for symbol in &other.symbols {
            if !merged.symbols.contains(symbol) {
                merged.symbols.push(symbol.clone());
            }
        }
        for diagnostic in &other.diagnostics {
            merged.push_diagnostic(diagnostic.clone());
        }
        Ok(merged)
    }

    /// The declared symbol of the first primary source.
    pub fn primary_symbol(&self) -> Option<&str> {
        self.symbols.first().map(String::as_str)
    }

    /// SHA-256 over destinations, roles and dependencies, hex encoded.
    ///
    /// Identical inputs always produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.role.as_str().as_bytes());
            hasher.update([0]);
            hasher.update(file.example.as_bytes());
            hasher.update([0]);
            hasher.update(file.destination.to_string_lossy().as_bytes());
            hasher.update([b'\n']);
        }
        for (name, version) in &self.dependencies {
            hasher.update(name.as_bytes());
            hasher.update([b'@']);
            hasher.update(version.as_bytes());
            hasher.update([b'\n']);
        }
        hex::encode(hasher.finalize())
    }
}

/// Turns manifest entries into an [`AssetSet`] against one assets root.
pub struct Resolver<'a> {
    assets_root: PathBuf,
    framework: &'a dyn Framework,
}

impl<'a> Resolver<'a> {
    pub fn new(assets_root: impl Into<PathBuf>, framework: &'a dyn Framework) -> Self {
        Self {
            assets_root: assets_root.into(),
            framework,
        }
    }

    /// Resolve entries in order into one asset set.
    pub fn resolve(&self, entries: &[&ManifestEntry]) -> Result<AssetSet> {
        let mut set = AssetSet::default();

        for entry in entries {
            self.resolve_entry(entry, &mut set)?;
        }

        tracing::debug!(
            "resolved {} example(s): {} files, {} dependencies",
            entries.len(),
            set.files.len(),
            set.dependencies.len()
        );
        Ok(set)
    }

    fn resolve_entry(&self, entry: &ManifestEntry, set: &mut AssetSet) -> Result<()> {
        let primary = self.existing_source(&entry.primary_asset)?;
        let test = self.existing_source(&entry.test_asset)?;
        let auxiliary = entry
            .auxiliary_assets
            .iter()
            .map(|aux| -> Result<(PathBuf, PathBuf)> {
                let destination = normalized_relative(aux)?;
                Ok((self.existing_source(aux)?, destination))
            })
            .collect::<Result<Vec<_>>>()?;

        let contents =
            std::fs::read_to_string(&primary).map_err(|e| ExemplarError::ReadSource {
                path: primary.clone(),
                source: e,
            })?;
        let symbol = match self.framework.declared_symbol(&contents) {
            Some(symbol) => symbol,
            None => {
                let stem = primary
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(entry.id.as_str())
                    .to_string();
                tracing::warn!(
                    "no declared symbol in {}, falling back to '{stem}'",
                    primary.display()
                );
                set.push_diagnostic(Diagnostic::SymbolFallback {
                    source: primary.clone(),
                    used: stem.clone(),
                });
                stem
            }
        };

        let contract_destination = self.framework.contract_destination(&symbol);
        let test_destination = self.framework.test_destination(&symbol, &test);

        set.insert(PlannedAsset {
            example: entry.id.clone(),
            role: AssetRole::Contract,
            source: primary,
            destination: contract_destination,
        })?;
        set.insert(PlannedAsset {
            example: entry.id.clone(),
            role: AssetRole::Test,
            source: test,
            destination: test_destination,
        })?;
        if !set.symbols.contains(&symbol) {
            set.symbols.push(symbol);
        }

        for (source, destination) in auxiliary {
            if set.insert(PlannedAsset {
                example: entry.id.clone(),
                role: AssetRole::Auxiliary,
                source,
                destination,
            })? {
                tracing::trace!("auxiliary asset added for {}", entry.id);
            }
        }

        for (name, version) in &entry.extra_dependencies {
            set.add_dependency(name, version, &entry.id);
        }

        Ok(())
    }

    fn existing_source(&self, relative: &Path) -> Result<PathBuf> {
        let path = self.assets_root.join(relative);
        if !path.is_file() {
            return Err(ExemplarError::MissingSourceFile(path));
        }
        Ok(path)
    }
}

/// An auxiliary path as a destination: relative, with no parent or root components.
fn normalized_relative(path: &Path) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => {
                return Err(ExemplarError::CatalogIntegrity(format!(
                    "auxiliary path {} must stay inside the assets root",
                    path.display()
                )))
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(ExemplarError::CatalogIntegrity(
            "empty auxiliary path".into(),
        ));
    }
    Ok(out)
}
