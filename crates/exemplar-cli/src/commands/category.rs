use std::path::PathBuf;

use anyhow::Result;

use exemplar_core::composer::ProjectMetadata;
use exemplar_core::resolver::Resolver;

use super::example::{compose, print_report};
use super::{Paths, Workspace};
use crate::output;

/// Build one project holding every example of a category, in category order.
pub async fn run(
    paths: &Paths,
    id: Option<String>,
    output_dir: Option<PathBuf>,
    no_git: bool,
) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let category = workspace.select_category(id.as_deref())?;

    output::print_header(&format!("exemplar category: {}", category.id));
    output::print_key_value("Examples", &category.examples.join(", "));

    let metadata = ProjectMetadata::for_category(category);
    let target = output_dir.unwrap_or_else(|| PathBuf::from(&metadata.package_name));

    output::print_step(1, 3, "Resolving assets");
    let entries = workspace.catalog.category_entries(category)?;
    let framework = super::framework();
    let assets = Resolver::new(&workspace.config.assets_root, &framework).resolve(&entries)?;
    output::print_diagnostics(&assets.diagnostics);

    output::print_step(2, 3, &format!("Composing {}/", super::display_path(&target)));
    let report = compose(&workspace, assets, metadata, target, no_git).await?;

    output::print_step(3, 3, "Checking prerequisites");
    super::report_prerequisites(&framework);

    print_report(&report);
    Ok(())
}
