//! Inject mode: merge one example into an existing, user-owned project.
//!
//! A run moves through `Planning → Applying → Committed`, or
//! `Planning → Applying → RollingBack → RolledBack` when an operation fails.
//!
//! Planning does all the reading: it checks the target's marker files, resolves
//! the example, loads every source, renders the deployment stub, asks the
//! conflict resolver about every destination that already exists, and
//! pre-computes the merged package manifest.
//! Any error there leaves the target untouched.
//!
//! Applying writes operations one at a time in asset-set order, recording each
//! in a [`TransactionLog`]. If one fails, the log is replayed in reverse and the
//! original error is returned together with the [`RollbackReport`].
//!
//! Two runs against the same target at the same time are not supported. An
//! interrupted run (process killed mid-apply) leaves the target in an undefined
//! state.

use std::collections::{BTreeMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::ManifestEntry;
use crate::composer::ProjectMetadata;
use crate::diagnostic::Diagnostic;
use crate::error::{ExemplarError, Result};
use crate::framework::Framework;
use crate::manifest::{DependencyChange, PackageManifest};
use crate::resolver::{AssetRole, Resolver};
use crate::templates::renderer::TemplateRenderer;
use crate::transaction::{InjectionState, TransactionLog, TransactionRecord};

/// What to do with a destination that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Leave the existing file untouched.
    Skip,
    /// Replace the existing file's content.
    Overwrite,
    /// Write the new content next to it under a disambiguated name.
    Rename,
}

/// Source of conflict decisions. Receives the destination relative to the
/// project root.
pub trait ConflictResolver {
    fn decide(&mut self, destination: &Path) -> Result<Decision>;
}

/// A fixed policy: the same decision for every conflict.
impl ConflictResolver for Decision {
    fn decide(&mut self, _destination: &Path) -> Result<Decision> {
        Ok(*self)
    }
}

impl<F> ConflictResolver for F
where
    F: FnMut(&Path) -> Decision,
{
    fn decide(&mut self, destination: &Path) -> Result<Decision> {
        Ok(self(destination))
    }
}

/// One planned mutation. Destinations are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Create { destination: PathBuf, content: Vec<u8> },
    Overwrite { destination: PathBuf, content: Vec<u8> },
    SkipConflict { destination: PathBuf },
}

impl FileOperation {
    pub fn destination(&self) -> &Path {
        match self {
            Self::Create { destination, .. }
            | Self::Overwrite { destination, .. }
            | Self::SkipConflict { destination } => destination,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Overwrite { .. } => "overwrite",
            Self::SkipConflict { .. } => "skip",
        }
    }
}

/// A file operation plus where it came from.
#[derive(Debug, Clone)]
pub struct PlannedOperation {
    pub operation: FileOperation,
    pub role: AssetRole,
    /// Set when a conflict was resolved with [`Decision::Rename`]: the
    /// destination the asset originally asked for.
    pub renamed_from: Option<PathBuf>,
}

/// The package manifest after merging, computed during planning.
#[derive(Debug, Clone)]
pub struct ManifestUpdate {
    /// Relative to the project root.
    pub destination: PathBuf,
    pub content: String,
    pub changes: Vec<DependencyChange>,
}

/// Everything a run will do, decided before any write.
#[derive(Debug, Clone)]
pub struct InjectionPlan {
    pub example: String,
    pub target_dir: PathBuf,
    pub operations: Vec<PlannedOperation>,
    /// `None` when the manifest already declares every dependency.
    pub manifest: Option<ManifestUpdate>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of a committed run.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionSummary {
    pub example: String,
    pub target_dir: PathBuf,
    pub created: Vec<PathBuf>,
    pub overwritten: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// `(requested destination, actual destination)`.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    pub manifest_updated: bool,
    /// Number of transaction records the run produced before committing.
    pub records: usize,
    pub state: InjectionState,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merges examples into existing projects.
pub struct Injector<'a> {
    framework: &'a dyn Framework,
    resolver: Resolver<'a>,
    renderer: TemplateRenderer,
}

impl<'a> Injector<'a> {
    pub fn new(framework: &'a dyn Framework, assets_root: impl Into<PathBuf>) -> Self {
        Self {
            framework,
            resolver: Resolver::new(assets_root, framework),
            renderer: TemplateRenderer::new(),
        }
    }

    /// Plan and apply in one go.
    pub fn inject(
        &self,
        entry: &ManifestEntry,
        target_dir: &Path,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<InjectionSummary> {
        let plan = self.plan(entry, target_dir, resolver)?;
        self.apply(plan)
    }

    /// Fail with `NotATargetProject` unless every marker file exists.
    pub fn check_target(&self, target_dir: &Path) -> Result<()> {
        let missing: Vec<PathBuf> = self
            .framework
            .marker_files()
            .iter()
            .map(PathBuf::from)
            .filter(|marker| !target_dir.join(marker).is_file())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExemplarError::NotATargetProject {
                path: target_dir.to_path_buf(),
                framework: self.framework.display_name(),
                missing,
            })
        }
    }

    /// The Planning phase. Reads only; never writes.
    pub fn plan(
        &self,
        entry: &ManifestEntry,
        target_dir: &Path,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<InjectionPlan> {
        tracing::info!(
            "planning injection of '{}' into {} ({})",
            entry.id,
            target_dir.display(),
            InjectionState::Planning.as_str()
        );
        self.check_target(target_dir)?;

        let assets = self.resolver.resolve(&[entry])?;
        let mut diagnostics = assets.diagnostics.clone();

        // Every file the example brings, then the deployment stub.
        let mut wanted = Vec::with_capacity(assets.files.len() + 1);
        for file in &assets.files {
            let content = std::fs::read(&file.source).map_err(|e| ExemplarError::ReadSource {
                path: file.source.clone(),
                source: e,
            })?;
            wanted.push((file.destination.clone(), file.role, content));
        }
        if let Some(primary) = assets.primary_symbol() {
            let stub = self.renderer.render(
                self.framework.deploy_stub_template(),
                &serde_json::json!({
                    "id": ProjectMetadata::for_example(entry).package_name,
                    "primary": primary,
                    "contracts": assets.symbols,
                }),
            )?;
            wanted.push((
                self.framework.deploy_stub_path(primary),
                AssetRole::DeployStub,
                stub.into_bytes(),
            ));
        }

        let mut taken: HashSet<PathBuf> = wanted.iter().map(|(d, _, _)| d.clone()).collect();
        let mut operations = Vec::with_capacity(wanted.len());

        for (destination, role, content) in wanted {
            let planned = if !occupied(&target_dir.join(&destination)) {
                PlannedOperation {
                    operation: FileOperation::Create {
                        destination,
                        content,
                    },
                    role,
                    renamed_from: None,
                }
            } else {
                let decision = resolver.decide(&destination)?;
                tracing::debug!("conflict on {}: {decision:?}", destination.display());
                match decision {
                    Decision::Skip => PlannedOperation {
                        operation: FileOperation::SkipConflict { destination },
                        role,
                        renamed_from: None,
                    },
                    Decision::Overwrite => PlannedOperation {
                        operation: FileOperation::Overwrite {
                            destination,
                            content,
                        },
                        role,
                        renamed_from: None,
                    },
                    Decision::Rename => {
                        let renamed = disambiguate(target_dir, &destination, &taken);
                        taken.insert(renamed.clone());
                        PlannedOperation {
                            operation: FileOperation::Create {
                                destination: renamed,
                                content,
                            },
                            role,
                            renamed_from: Some(destination),
                        }
                    }
                }
            };
            operations.push(planned);
        }

        let manifest = self.plan_manifest(target_dir, &assets.dependencies, &mut diagnostics)?;

        Ok(InjectionPlan {
            example: entry.id.clone(),
            target_dir: target_dir.to_path_buf(),
            operations,
            manifest,
            diagnostics,
        })
    }

    fn plan_manifest(
        &self,
        target_dir: &Path,
        dependencies: &BTreeMap<String, String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<ManifestUpdate>> {
        if dependencies.is_empty() {
            return Ok(None);
        }

        let destination = PathBuf::from(self.framework.package_manifest());
        let mut manifest = PackageManifest::load_or_empty(&target_dir.join(&destination))?;
        let changes =
            manifest.merge_dependencies(self.framework.dependency_section(), dependencies)?;
        if changes.is_empty() {
            return Ok(None);
        }

        for change in &changes {
            if let DependencyChange::Updated {
                name,
                previous,
                version,
            } = change
            {
                tracing::warn!(
                    "dependency {name}: project has {previous}, example needs {version}"
                );
                diagnostics.push(Diagnostic::DependencyUpdated {
                    name: name.clone(),
                    previous: previous.clone(),
                    current: version.clone(),
                });
            }
        }

        Ok(Some(ManifestUpdate {
            destination,
            content: manifest.to_pretty_string()?,
            changes,
        }))
    }

    /// The Applying phase, ending in `Committed` or `RolledBack`.
    pub fn apply(&self, plan: InjectionPlan) -> Result<InjectionSummary> {
        tracing::info!(
            "applying {} operation(s) to {} ({})",
            plan.operations.len(),
            plan.target_dir.display(),
            InjectionState::Applying.as_str()
        );

        let mut log = TransactionLog::new();
        let result = apply_operations(&plan, &mut log);
        if log.is_empty() {
            tracing::debug!("nothing was written");
        }
        match result {
            Ok(()) => {
                let records = log.commit();
                tracing::info!("injection of '{}' committed", plan.example);
                Ok(summarize(plan, records))
            }
            Err(failure) => {
                tracing::error!(
                    "failed to {} {}: {}; {} {} record(s)",
                    failure.operation,
                    failure.path.display(),
                    failure.source,
                    InjectionState::RollingBack.as_str(),
                    log.len()
                );
                let rollback = log.rollback();
                if rollback.is_complete() {
                    tracing::info!("injection of '{}' rolled back", plan.example);
                } else {
                    tracing::warn!(
                        "rollback incomplete: {} path(s) could not be restored",
                        rollback.failures.len()
                    );
                }
                Err(ExemplarError::ApplyFailure {
                    path: failure.path,
                    operation: failure.operation,
                    source: failure.source,
                    rollback,
                })
            }
        }
    }
}

struct Failure {
    path: PathBuf,
    operation: &'static str,
    source: std::io::Error,
}

fn fail<'a>(path: &'a Path, operation: &'static str) -> impl FnOnce(std::io::Error) -> Failure + 'a {
    move |source| Failure {
        path: path.to_path_buf(),
        operation,
        source,
    }
}

type ApplyResult = std::result::Result<(), Failure>;

fn apply_operations(plan: &InjectionPlan, log: &mut TransactionLog) -> ApplyResult {
    for planned in &plan.operations {
        let path = plan.target_dir.join(planned.operation.destination());
        match &planned.operation {
            FileOperation::Create { content, .. } => create_file(&path, content, log)?,
            FileOperation::Overwrite { content, .. } => overwrite_file(&path, content, log)?,
            FileOperation::SkipConflict { .. } => {
                tracing::debug!("skipped {}", path.display());
            }
        }
    }

    if let Some(update) = &plan.manifest {
        let path = plan.target_dir.join(&update.destination);
        if path.exists() {
            overwrite_file(&path, update.content.as_bytes(), log)?;
        } else {
            create_file(&path, update.content.as_bytes(), log)?;
        }
    }
    Ok(())
}

/// Create a file that must not exist yet, creating (and recording) any missing
/// parent directories.
fn create_file(path: &Path, content: &[u8], log: &mut TransactionLog) -> ApplyResult {
    if let Some(parent) = path.parent() {
        let mut missing = Vec::new();
        let mut current = parent;
        while !current.exists() {
            missing.push(current.to_path_buf());
            match current.parent() {
                Some(p) => current = p,
                None => break,
            }
        }
        for dir in missing.into_iter().rev() {
            std::fs::create_dir(&dir).map_err(fail(&dir, "create directory"))?;
            log.record(TransactionRecord::CreatedDir { path: dir });
        }
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(fail(path, "create"))?;
    log.record(TransactionRecord::Created {
        path: path.to_path_buf(),
    });
    file.write_all(content).map_err(fail(path, "write"))?;
    tracing::debug!("created {}", path.display());
    Ok(())
}

/// Replace a file's content, recording the original bytes first so a partial
/// write is restored too.
fn overwrite_file(path: &Path, content: &[u8], log: &mut TransactionLog) -> ApplyResult {
    let original = std::fs::read(path).map_err(fail(path, "read"))?;
    log.record(TransactionRecord::Overwritten {
        path: path.to_path_buf(),
        original,
    });
    std::fs::write(path, content).map_err(fail(path, "overwrite"))?;
    tracing::debug!("overwrote {}", path.display());
    Ok(())
}

/// Anything at `path`, a dangling symlink included.
fn occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// `<stem>_<n>.<ext>` for the smallest `n` free on disk and in this plan.
fn disambiguate(target_dir: &Path, destination: &Path, taken: &HashSet<PathBuf>) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = destination
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = destination.with_file_name(format!("{stem}_{n}{extension}"));
        if !taken.contains(&candidate) && !occupied(&target_dir.join(&candidate)) {
            return candidate;
        }
        n += 1;
    }
}

fn summarize(plan: InjectionPlan, records: usize) -> InjectionSummary {
    let mut summary = InjectionSummary {
        example: plan.example,
        target_dir: plan.target_dir,
        created: Vec::new(),
        overwritten: Vec::new(),
        skipped: Vec::new(),
        renamed: Vec::new(),
        manifest_updated: plan.manifest.is_some(),
        records,
        state: InjectionState::Committed,
        diagnostics: plan.diagnostics,
    };

    for planned in plan.operations {
        let destination = planned.operation.destination().to_path_buf();
        match (planned.operation, planned.renamed_from) {
            (FileOperation::Create { .. }, Some(requested)) => {
                summary.renamed.push((requested, destination))
            }
            (FileOperation::Create { .. }, None) => summary.created.push(destination),
            (FileOperation::Overwrite { .. }, _) => summary.overwritten.push(destination),
            (FileOperation::SkipConflict { .. }, _) => summary.skipped.push(destination),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, StubFramework};
    use pretty_assertions::assert_eq;

    fn foo_with_conflict(project: &Path, contents: &str) {
        testing::write_source(project, "contracts/Foo.src", contents);
    }

    #[test]
    fn test_inject_into_clean_project() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        let foo = testing::entry("foo", "Foo", &["shared/mocks/Mock.src"], &[("lib-a", "^1.0.0")]);

        let summary = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Skip)
            .unwrap();

        assert_eq!(summary.state, InjectionState::Committed);
        assert_eq!(
            summary.created,
            vec![
                PathBuf::from("contracts/Foo.src"),
                PathBuf::from("test/Foo.test"),
                PathBuf::from("shared/mocks/Mock.src"),
                PathBuf::from("deploy/Foo.stub"),
            ]
        );
        assert!(summary.manifest_updated);
        assert!(project.path().join("shared/mocks/Mock.src").is_file());
        assert_eq!(
            std::fs::read_to_string(project.path().join("deploy/Foo.stub")).unwrap(),
            "deploy example-foo: Foo\n"
        );
        // Untouched user code.
        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Mine.src")).unwrap(),
            "contract Mine {}\n"
        );

        let manifest = PackageManifest::load(&project.path().join("package.manifest")).unwrap();
        assert_eq!(manifest.name(), Some("user-project"));
        let deps = manifest.dependencies("dependencies");
        assert_eq!(deps["user-lib"], "^4.0.0");
        assert_eq!(deps["lib-a"], "^1.0.0");
    }

    #[test]
    fn test_manifest_keeps_user_key_order() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        let foo = testing::entry("foo", "Foo", &[], &[("lib-a", "1")]);

        Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Skip)
            .unwrap();

        let contents = std::fs::read_to_string(project.path().join("package.manifest")).unwrap();
        let name_at = contents.find("\"name\"").unwrap();
        let scripts_at = contents.find("\"scripts\"").unwrap();
        let deps_at = contents.find("\"dependencies\"").unwrap();
        assert!(name_at < scripts_at && scripts_at < deps_at);
    }

    #[test]
    fn test_conflict_skip_leaves_file_and_records_nothing_for_it() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        foo_with_conflict(project.path(), "user version of Foo\n");
        let foo = testing::entry("foo", "Foo", &[], &[]);

        let summary = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut |_: &Path| Decision::Skip)
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Foo.src")).unwrap(),
            "user version of Foo\n"
        );
        assert_eq!(summary.skipped, vec![PathBuf::from("contracts/Foo.src")]);
        assert_eq!(
            summary.created,
            vec![PathBuf::from("test/Foo.test"), PathBuf::from("deploy/Foo.stub")]
        );
        // Two directories and two files; nothing for the skipped path.
        assert_eq!(summary.records, 4);
        assert!(!summary.manifest_updated);
    }

    #[test]
    fn test_conflict_rename_writes_beside_original() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        foo_with_conflict(project.path(), "user version of Foo\n");
        let foo = testing::entry("foo", "Foo", &[], &[]);

        let summary = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Rename)
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Foo.src")).unwrap(),
            "user version of Foo\n"
        );
        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Foo_1.src")).unwrap(),
            "contract Foo {}\n"
        );
        assert_eq!(
            summary.renamed,
            vec![(
                PathBuf::from("contracts/Foo.src"),
                PathBuf::from("contracts/Foo_1.src")
            )]
        );
    }

    #[test]
    fn test_rename_skips_names_already_taken() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        foo_with_conflict(project.path(), "a");
        testing::write_source(project.path(), "contracts/Foo_1.src", "b");
        let foo = testing::entry("foo", "Foo", &[], &[]);

        let summary = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Rename)
            .unwrap();
        assert_eq!(summary.renamed[0].1, PathBuf::from("contracts/Foo_2.src"));
        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Foo_1.src")).unwrap(),
            "b"
        );
    }

    #[test]
    fn test_conflict_overwrite() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        foo_with_conflict(project.path(), "user version of Foo\n");
        let foo = testing::entry("foo", "Foo", &[], &[]);

        let summary = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Overwrite)
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Foo.src")).unwrap(),
            "contract Foo {}\n"
        );
        assert_eq!(summary.overwritten, vec![PathBuf::from("contracts/Foo.src")]);
    }

    #[test]
    fn test_decision_asked_only_for_conflicts() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        foo_with_conflict(project.path(), "x");
        let foo = testing::entry("foo", "Foo", &[], &[]);

        let mut asked = Vec::new();
        let mut decide = |path: &Path| {
            asked.push(path.to_path_buf());
            Decision::Skip
        };
        Injector::new(&StubFramework, assets.path())
            .plan(&foo, project.path(), &mut decide)
            .unwrap();
        assert_eq!(asked, vec![PathBuf::from("contracts/Foo.src")]);
    }

    #[test]
    fn test_existing_deploy_stub_goes_through_resolver() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        testing::write_source(project.path(), "deploy/Foo.stub", "mine\n");
        let foo = testing::entry("foo", "Foo", &[], &[]);
        let injector = Injector::new(&StubFramework, assets.path());

        let mut asked = Vec::new();
        let mut decide = |path: &Path| {
            asked.push(path.to_path_buf());
            Decision::Skip
        };
        let summary = injector.inject(&foo, project.path(), &mut decide).unwrap();
        assert_eq!(asked, vec![PathBuf::from("deploy/Foo.stub")]);
        assert_eq!(summary.skipped, vec![PathBuf::from("deploy/Foo.stub")]);
        assert_eq!(
            std::fs::read_to_string(project.path().join("deploy/Foo.stub")).unwrap(),
            "mine\n"
        );

        let summary = injector
            .inject(&foo, project.path(), &mut Decision::Rename)
            .unwrap();
        assert!(summary
            .renamed
            .contains(&(PathBuf::from("deploy/Foo.stub"), PathBuf::from("deploy/Foo_1.stub"))));
        assert_eq!(
            std::fs::read_to_string(project.path().join("deploy/Foo.stub")).unwrap(),
            "mine\n"
        );
        assert_eq!(
            std::fs::read_to_string(project.path().join("deploy/Foo_1.stub")).unwrap(),
            "deploy example-foo: Foo\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_conflict() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        let link = project.path().join("contracts/Foo.src");
        std::os::unix::fs::symlink("nowhere", &link).unwrap();
        let foo = testing::entry("foo", "Foo", &[], &[]);

        let mut asked = Vec::new();
        let mut decide = |path: &Path| {
            asked.push(path.to_path_buf());
            Decision::Skip
        };
        let summary = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut decide)
            .unwrap();

        assert_eq!(asked, vec![PathBuf::from("contracts/Foo.src")]);
        assert_eq!(summary.skipped, vec![PathBuf::from("contracts/Foo.src")]);
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert!(!link.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_rename_steps_over_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink("nowhere", dir.path().join("a/Foo_1.sol")).unwrap();
        assert_eq!(
            disambiguate(dir.path(), Path::new("a/Foo.sol"), &HashSet::new()),
            PathBuf::from("a/Foo_2.sol")
        );
    }

    #[test]
    fn test_apply_failure_restores_original_bytes() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        foo_with_conflict(project.path(), "X");
        // A regular file where the auxiliary asset needs a directory.
        testing::write_source(project.path(), "shared", "not a directory");
        let foo = testing::entry("foo", "Foo", &["shared/IShared.src"], &[("lib-a", "1")]);

        let files_before = testing::snapshot(project.path());
        let dirs_before = testing::list_dirs(project.path());

        let err = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Overwrite)
            .unwrap_err();

        match err {
            ExemplarError::ApplyFailure { path, rollback, .. } => {
                assert_eq!(path, project.path().join("shared/IShared.src"));
                assert!(rollback.is_complete());
                assert_eq!(rollback.state, InjectionState::RolledBack);
            }
            other => panic!("expected ApplyFailure, got {other:?}"),
        }
        assert_eq!(
            std::fs::read_to_string(project.path().join("contracts/Foo.src")).unwrap(),
            "X"
        );
        assert!(!project.path().join("test/Foo.test").exists());
        assert_eq!(testing::snapshot(project.path()), files_before);
        assert_eq!(testing::list_dirs(project.path()), dirs_before);
    }

    #[test]
    fn test_not_a_target_project() {
        let assets = testing::assets_dir();
        let empty = tempfile::tempdir().unwrap();
        testing::write_source(empty.path(), "a.cfg", "x");
        let before = testing::snapshot(empty.path());
        let foo = testing::entry("foo", "Foo", &[], &[]);

        match Injector::new(&StubFramework, assets.path()).inject(
            &foo,
            empty.path(),
            &mut Decision::Overwrite,
        ) {
            Err(ExemplarError::NotATargetProject { missing, .. }) => {
                assert_eq!(missing, vec![PathBuf::from("package.manifest")]);
            }
            other => panic!("expected NotATargetProject, got {other:?}"),
        }
        assert_eq!(testing::snapshot(empty.path()), before);
    }

    #[test]
    fn test_missing_source_leaves_target_untouched() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        let before = testing::snapshot(project.path());
        let mut foo = testing::entry("foo", "Foo", &[], &[("lib-a", "1")]);
        foo.test_asset = PathBuf::from("src/Gone.test");

        let err = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Overwrite)
            .unwrap_err();
        assert!(matches!(err, ExemplarError::MissingSourceFile(_)));
        assert!(err.is_planning_error());
        assert_eq!(testing::snapshot(project.path()), before);
    }

    #[test]
    fn test_broken_manifest_fails_during_planning() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        testing::write_source(project.path(), "package.manifest", "{ broken");
        let before = testing::snapshot(project.path());
        let foo = testing::entry("foo", "Foo", &[], &[("lib-a", "1")]);

        let err = Injector::new(&StubFramework, assets.path())
            .inject(&foo, project.path(), &mut Decision::Overwrite)
            .unwrap_err();
        assert!(matches!(err, ExemplarError::ManifestParse { .. }));
        assert_eq!(testing::snapshot(project.path()), before);
    }

    #[test]
    fn test_plan_does_not_write() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        let before = testing::snapshot(project.path());
        let foo = testing::entry("foo", "Foo", &["shared/IShared.src"], &[("lib-a", "1")]);

        let plan = Injector::new(&StubFramework, assets.path())
            .plan(&foo, project.path(), &mut Decision::Overwrite)
            .unwrap();

        let kinds: Vec<_> = plan.operations.iter().map(|p| p.operation.kind()).collect();
        assert_eq!(kinds, vec!["create", "create", "create", "create"]);
        assert!(plan.manifest.is_some());
        assert_eq!(testing::snapshot(project.path()), before);
    }

    #[test]
    fn test_dependency_merge_is_additive_across_runs() {
        let assets = testing::assets_dir();
        let project = testing::project_dir();
        let foo = testing::entry("foo", "Foo", &[], &[("lib-a", "1"), ("shared-lib", "1")]);
        let bar = testing::entry("bar", "Bar", &[], &[("lib-b", "2"), ("shared-lib", "2")]);
        let injector = Injector::new(&StubFramework, assets.path());

        injector
            .inject(&foo, project.path(), &mut Decision::Skip)
            .unwrap();
        let summary = injector
            .inject(&bar, project.path(), &mut Decision::Skip)
            .unwrap();

        let deps = PackageManifest::load(&project.path().join("package.manifest"))
            .unwrap()
            .dependencies("dependencies");
        assert_eq!(deps["user-lib"], "^4.0.0");
        assert_eq!(deps["lib-a"], "1");
        assert_eq!(deps["lib-b"], "2");
        assert_eq!(deps["shared-lib"], "2");
        assert_eq!(
            summary.diagnostics,
            vec![Diagnostic::DependencyUpdated {
                name: "shared-lib".into(),
                previous: "1".into(),
                current: "2".into(),
            }]
        );
    }

    #[test]
    fn test_disambiguate() {
        let dir = tempfile::tempdir().unwrap();
        let taken: HashSet<PathBuf> = [PathBuf::from("a/Foo_1.sol")].into_iter().collect();
        assert_eq!(
            disambiguate(dir.path(), Path::new("a/Foo.sol"), &taken),
            PathBuf::from("a/Foo_2.sol")
        );
        assert_eq!(
            disambiguate(dir.path(), Path::new("README"), &HashSet::new()),
            PathBuf::from("README_1")
        );
    }
}
