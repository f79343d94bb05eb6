use std::path::Path;

use anyhow::Result;
use dialoguer::Select;

use exemplar_core::error::{ExemplarError, Result as CoreResult};
use exemplar_core::framework::Framework;
use exemplar_core::inject::{ConflictResolver, Decision, InjectionPlan, Injector};
use exemplar_core::manifest::DependencyChange;

use super::{Paths, Workspace};
use crate::output;
use crate::ConflictChoice;

/// Asks on the terminal what to do with each existing file.
///
/// The "... all" answers stick for the rest of the run.
struct PromptResolver {
    sticky: Option<Decision>,
}

const CHOICES: [(&str, Decision, bool); 6] = [
    ("Skip (keep my file)", Decision::Skip, false),
    ("Overwrite", Decision::Overwrite, false),
    ("Rename (write next to it)", Decision::Rename, false),
    ("Skip all", Decision::Skip, true),
    ("Overwrite all", Decision::Overwrite, true),
    ("Rename all", Decision::Rename, true),
];

impl ConflictResolver for PromptResolver {
    fn decide(&mut self, destination: &Path) -> CoreResult<Decision> {
        if let Some(decision) = self.sticky {
            return Ok(decision);
        }

        let labels: Vec<&str> = CHOICES.iter().map(|(label, _, _)| *label).collect();
        let selection = Select::new()
            .with_prompt(format!("{} already exists", destination.display()))
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| ExemplarError::Prompt {
                path: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        let (_, decision, sticky) = CHOICES[selection];
        if sticky {
            self.sticky = Some(decision);
        }
        Ok(decision)
    }
}

/// Inject one example into an existing project.
///
/// Every conflict is decided before the first write. A failure while writing
/// rolls the project back and reports whether the rollback was complete.
pub async fn run(
    paths: &Paths,
    id: Option<String>,
    target: &Path,
    on_conflict: ConflictChoice,
    dry_run: bool,
) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let entry = workspace.select_example(id.as_deref())?;

    output::print_header(&format!("exemplar inject: {}", entry.id));
    output::print_key_value("Target", &super::display_path(target));

    let framework = super::framework();
    let injector = Injector::new(&framework, &workspace.config.assets_root);

    let mut prompt = PromptResolver { sticky: None };
    let mut policy = on_conflict.policy();
    let resolver: &mut dyn ConflictResolver = match policy.as_mut() {
        Some(decision) => decision,
        None => {
            if !console::user_attended() {
                anyhow::bail!("no terminal to prompt on; pass --on-conflict skip|overwrite|rename");
            }
            &mut prompt
        }
    };

    output::print_step(1, 2, "Planning");
    let plan = injector.plan(entry, target, resolver)?;
    output::print_diagnostics(&plan.diagnostics);

    if dry_run {
        print_plan(&plan);
        output::print_success("Dry run: nothing was written");
        return Ok(());
    }

    output::print_step(2, 2, "Applying");
    let summary = match injector.apply(plan) {
        Ok(summary) => summary,
        Err(ExemplarError::ApplyFailure {
            path,
            operation,
            source,
            rollback,
        }) => {
            output::print_error(&format!("failed to {operation} {}: {source}", path.display()));
            if rollback.is_complete() {
                output::print_warning(&format!(
                    "Rolled back: restored {} path(s), project is unchanged",
                    rollback.restored.len()
                ));
            } else {
                for failure in &rollback.failures {
                    output::print_error(&format!(
                        "could not restore {}: {}",
                        failure.path.display(),
                        failure.reason
                    ));
                }
            }
            anyhow::bail!("injection of '{}' failed ({})", entry.id, rollback.state.as_str());
        }
        Err(e) => return Err(e.into()),
    };

    output::print_success(&format!(
        "Injected '{}' ({} record(s) committed)",
        summary.example, summary.records
    ));
    for path in &summary.created {
        output::print_key_value("created", &path.display().to_string());
    }
    for path in &summary.overwritten {
        output::print_key_value("overwritten", &path.display().to_string());
    }
    for (requested, actual) in &summary.renamed {
        output::print_key_value(
            "renamed",
            &format!("{} -> {}", requested.display(), actual.display()),
        );
    }
    for path in &summary.skipped {
        output::print_key_value("skipped", &path.display().to_string());
    }
    if summary.manifest_updated {
        output::print_key_value("updated", framework.package_manifest());
    }
    println!();

    Ok(())
}

fn print_plan(plan: &InjectionPlan) {
    for planned in &plan.operations {
        let destination = planned.operation.destination();
        let line = match &planned.renamed_from {
            Some(requested) => format!(
                "{} (instead of {})",
                destination.display(),
                requested.display()
            ),
            None => destination.display().to_string(),
        };
        output::print_key_value(planned.operation.kind(), &line);
    }
    if let Some(update) = &plan.manifest {
        let manifest = update.destination.display().to_string();
        for change in &update.changes {
            let line = match change {
                DependencyChange::Added { name, version } => format!("add {name}@{version}"),
                DependencyChange::Updated {
                    name,
                    previous,
                    version,
                } => format!("update {name} {previous} -> {version}"),
            };
            output::print_key_value(&manifest, &line);
        }
    }
}
