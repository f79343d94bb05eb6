use anyhow::Result;
use serde::Serialize;

use exemplar_core::catalog::ManifestEntry;
use exemplar_core::resolver::{AssetSet, Resolver};

use super::{Paths, Workspace};
use crate::output;

#[derive(Serialize)]
struct PlanReport<'a> {
    fingerprint: String,
    assets: &'a AssetSet,
}

/// Resolve examples (or a category) and print the asset set without writing.
pub async fn run(paths: &Paths, ids: &[String], category: Option<&str>, json: bool) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let catalog = &workspace.catalog;

    let entries: Vec<&ManifestEntry> = match category {
        Some(id) => catalog.category_entries(catalog.lookup_category(id)?)?,
        None if ids.is_empty() => anyhow::bail!("give at least one example id, or --category"),
        None => ids
            .iter()
            .map(|id| catalog.lookup_example(id))
            .collect::<Result<_, _>>()?,
    };

    let framework = super::framework();
    let assets = Resolver::new(&workspace.config.assets_root, &framework).resolve(&entries)?;
    let fingerprint = assets.fingerprint();

    if json {
        let report = PlanReport {
            fingerprint,
            assets: &assets,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::print_header("exemplar plan");
    for file in &assets.files {
        output::print_key_value(
            file.role.as_str(),
            &format!(
                "{} -> {}",
                file.source
                    .strip_prefix(&workspace.config.assets_root)
                    .unwrap_or(&file.source)
                    .display(),
                file.destination.display()
            ),
        );
    }
    for (name, version) in &assets.dependencies {
        output::print_key_value("dependency", &format!("{name}@{version}"));
    }
    output::print_key_value("contracts", &assets.symbols.join(", "));
    output::print_diagnostics(&assets.diagnostics);
    output::print_key_value("fingerprint", &fingerprint);
    println!();

    Ok(())
}
