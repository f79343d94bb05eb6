use std::path::PathBuf;

use anyhow::Result;

use exemplar_core::composer::{ComposeReport, Composer, ProjectMetadata};
use exemplar_core::resolver::{AssetSet, Resolver};

use super::{Paths, Workspace};
use crate::output;

/// Build a standalone project for one example.
///
/// Resolves the example's assets, composes a fresh project from the base
/// template, and checks for the tools the generated project needs. If no id is
/// given, prompts interactively.
pub async fn run(
    paths: &Paths,
    id: Option<String>,
    output_dir: Option<PathBuf>,
    name: Option<String>,
    no_git: bool,
) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let entry = workspace.select_example(id.as_deref())?;

    output::print_header(&format!("exemplar example: {}", entry.id));

    let mut metadata = ProjectMetadata::for_example(entry);
    if let Some(name) = name {
        metadata.package_name = name;
    }
    let target = output_dir.unwrap_or_else(|| PathBuf::from(&metadata.package_name));

    output::print_step(1, 3, "Resolving assets");
    let framework = super::framework();
    let assets = Resolver::new(&workspace.config.assets_root, &framework).resolve(&[entry])?;
    output::print_diagnostics(&assets.diagnostics);

    output::print_step(2, 3, &format!("Composing {}/", super::display_path(&target)));
    let report = compose(&workspace, assets, metadata, target, no_git).await?;

    output::print_step(3, 3, "Checking prerequisites");
    super::report_prerequisites(&framework);

    print_report(&report);
    Ok(())
}

/// Run the composer off the async runtime with a spinner on screen.
pub(super) async fn compose(
    workspace: &Workspace,
    assets: AssetSet,
    metadata: ProjectMetadata,
    target: PathBuf,
    no_git: bool,
) -> Result<ComposeReport> {
    let template = workspace.config.template_dir.clone();
    let spinner = output::Spinner::new(format!("Writing {}", metadata.package_name));

    let report = tokio::task::spawn_blocking(move || {
        let framework = super::framework();
        let composer = Composer::new(&framework);
        let composer = if no_git {
            composer.without_vcs()
        } else {
            composer
        };
        composer.compose(&template, &assets, &metadata, &target)
    })
    .await??;

    spinner.finish();
    Ok(report)
}

pub(super) fn print_report(report: &ComposeReport) {
    let dir = super::display_path(&report.target_dir);
    output::print_success(&format!("Project created in {dir}/"));
    for file in &report.written {
        output::print_key_value("wrote", &file.display().to_string());
    }
    output::print_key_value("deploy", &report.deploy_stub.display().to_string());
    if report.vcs_initialized {
        output::print_key_value("git", "initialized");
    }

    println!();
    println!("  Next steps:");
    println!("    cd {dir}");
    println!("    npm install");
    println!("    npx hardhat test");
    println!();
}
