//! Fresh-project build mode.
//!
//! Copies a base template into a directory that must not exist yet, swaps the
//! template's placeholders for the resolved assets, renders the deployment stub
//! and rewrites the package manifest in canonical form.
//!
//! Nothing outside the target directory is touched. A failure partway leaves a
//! freshly created, incomplete directory for the caller to discard; there is no
//! rollback in this mode.
//!
//! ## Steps
//!
//! ```text
//! 1. copy base template      (excluding framework copy exclusions)
//! 2. remove placeholders     (fixed list) + rewrite build config
//! 3. write resolved assets   (creating parent directories)
//! 4. render deployment stub
//! 5. rewrite package manifest (name, description, merged dependencies, sorted keys)
//! 6. git init                (best effort, never fatal)
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::catalog::{CategoryManifest, ManifestEntry};
use crate::diagnostic::Diagnostic;
use crate::error::{ExemplarError, Result};
use crate::framework::Framework;
use crate::manifest::PackageManifest;
use crate::resolver::AssetSet;
use crate::templates::renderer::TemplateRenderer;

/// Naming for the generated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub package_name: String,
    pub description: Option<String>,
}

impl ProjectMetadata {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            description: None,
        }
    }

    /// `example-<id>` with the example's description.
    pub fn for_example(entry: &ManifestEntry) -> Self {
        Self {
            package_name: format!("example-{}", kebab_case(&entry.id)),
            description: Some(entry.description.clone()).filter(|d| !d.is_empty()),
        }
    }

    /// `examples-<id>` described by the category's display name.
    pub fn for_category(category: &CategoryManifest) -> Self {
        Self {
            package_name: format!("examples-{}", kebab_case(&category.id)),
            description: Some(category.display_name.clone()).filter(|d| !d.is_empty()),
        }
    }
}

/// Lowercase, with runs of non-alphanumerics collapsed to a single `-`.
pub fn kebab_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// What a compose run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeReport {
    pub target_dir: PathBuf,
    /// Asset files written, relative to `target_dir`.
    pub written: Vec<PathBuf>,
    /// Placeholders that were present and removed.
    pub removed_placeholders: Vec<PathBuf>,
    pub deploy_stub: PathBuf,
    pub vcs_initialized: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds fresh projects from a base template.
pub struct Composer<'a> {
    framework: &'a dyn Framework,
    renderer: TemplateRenderer,
    init_vcs: bool,
}

impl<'a> Composer<'a> {
    pub fn new(framework: &'a dyn Framework) -> Self {
        Self {
            framework,
            renderer: TemplateRenderer::new(),
            init_vcs: true,
        }
    }

    /// Skip the `git init` step.
    pub fn without_vcs(mut self) -> Self {
        self.init_vcs = false;
        self
    }

    /// Compose a new project at `target_dir`.
    pub fn compose(
        &self,
        base_template: &Path,
        assets: &AssetSet,
        metadata: &ProjectMetadata,
        target_dir: &Path,
    ) -> Result<ComposeReport> {
        // Everything that can fail without touching the disk happens first.
        if target_dir.exists() {
            return Err(ExemplarError::TargetAlreadyExists(target_dir.to_path_buf()));
        }
        if !base_template.is_dir() {
            return Err(ExemplarError::MissingSourceFile(base_template.to_path_buf()));
        }
        let template_root = base_template.canonicalize()?;
        if resolve_target(target_dir)?.starts_with(&template_root) {
            return Err(ExemplarError::TargetInsideTemplate {
                target: target_dir.to_path_buf(),
                template: base_template.to_path_buf(),
            });
        }
        let primary = assets.primary_symbol().ok_or_else(|| {
            ExemplarError::CatalogIntegrity("nothing to compose: asset set is empty".into())
        })?;
        let deploy_stub = self.framework.deploy_stub_path(primary);
        let stub_contents = self.renderer.render(
            self.framework.deploy_stub_template(),
            &serde_json::json!({
                "id": metadata.package_name,
                "primary": primary,
                "contracts": assets.symbols,
            }),
        )?;

        tracing::info!(
            "composing {} into {}",
            metadata.package_name,
            target_dir.display()
        );

        // Step 1
        copy_template(base_template, target_dir, self.framework.copy_exclusions())?;

        // Step 2
        let removed_placeholders = self.remove_placeholders(target_dir)?;

        // Step 3
        let mut written = Vec::with_capacity(assets.files.len());
        for file in &assets.files {
            let destination = target_dir.join(&file.destination);
            if let Some(parent) = destination.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&file.source, &destination)?;
            tracing::debug!("wrote {} ({})", file.destination.display(), file.role.as_str());
            written.push(file.destination.clone());
        }

        // Step 4
        let stub_path = target_dir.join(&deploy_stub);
        if let Some(parent) = stub_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&stub_path, stub_contents)?;

        // Step 5
        self.rewrite_manifest(target_dir, assets, metadata)?;

        // Step 6
        let vcs_initialized = self.init_vcs && init_repository(target_dir);

        tracing::info!("composed {} file(s) into {}", written.len(), target_dir.display());

        Ok(ComposeReport {
            target_dir: target_dir.to_path_buf(),
            written,
            removed_placeholders,
            deploy_stub,
            vcs_initialized,
            diagnostics: assets.diagnostics.clone(),
        })
    }

    fn remove_placeholders(&self, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for placeholder in self.framework.placeholder_files() {
            let path = target_dir.join(placeholder);
            if path.is_file() {
                std::fs::remove_file(&path)?;
                tracing::debug!("removed placeholder {placeholder}");
                removed.push(PathBuf::from(placeholder));
            }
        }

        let config = target_dir.join(self.framework.build_config());
        if config.is_file() {
            let contents = std::fs::read_to_string(&config)?;
            let rewritten = self.framework.rewrite_build_config(&contents);
            if rewritten != contents {
                std::fs::write(&config, rewritten)?;
                tracing::debug!("rewrote {}", self.framework.build_config());
            }
        }
        Ok(removed)
    }

    fn rewrite_manifest(
        &self,
        target_dir: &Path,
        assets: &AssetSet,
        metadata: &ProjectMetadata,
    ) -> Result<()> {
        let path = target_dir.join(self.framework.package_manifest());
        let mut manifest = PackageManifest::load_or_empty(&path)?;
        manifest.set_name(&metadata.package_name);
        if let Some(description) = &metadata.description {
            manifest.set_description(description);
        }
        for change in
            manifest.merge_dependencies(self.framework.dependency_section(), &assets.dependencies)?
        {
            tracing::debug!("package manifest: {change:?}");
        }
        std::fs::write(&path, manifest.to_canonical_string()?)?;
        Ok(())
    }
}

/// Recursively copy `from` into the new directory `to`, skipping top-level
/// entries named in `exclusions`.
/// Absolute form of a path that may not exist yet: the nearest existing
/// ancestor is canonicalized and the missing components are appended back.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

fn copy_template(from: &Path, to: &Path, exclusions: &[&str]) -> Result<()> {
    std::fs::create_dir_all(to)?;

    let walker = walkdir::WalkDir::new(from)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() != 1
                || !exclusions
                    .iter()
                    .any(|excluded| entry.file_name() == std::ffi::OsStr::new(excluded))
        });

    for entry in walker {
        let entry = entry.map_err(|e| anyhow::anyhow!("walking {}: {e}", from.display()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let destination = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination)?;
        } else {
            std::fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

/// Best-effort `git init`. Returns whether a repository was created; failures
/// are logged and swallowed.
fn init_repository(dir: &Path) -> bool {
    if which::which("git").is_err() {
        tracing::warn!("git not found, skipping repository initialization");
        return false;
    }

    match Command::new("git")
        .args(["init", "--quiet"])
        .current_dir(dir)
        .output()
    {
        Ok(output) if output.status.success() => {
            tracing::debug!("initialized git repository in {}", dir.display());
            true
        }
        Ok(output) => {
            tracing::warn!(
                "git init failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            false
        }
        Err(e) => {
            tracing::warn!("git init failed: {e}");
            false
        }
    }
}
