use anyhow::Result;
use serde::Serialize;

use exemplar_core::catalog::{CategoryManifest, ManifestEntry};

use super::{Paths, Workspace};
use crate::output;

#[derive(Serialize)]
struct Listing<'a> {
    examples: &'a [ManifestEntry],
    categories: &'a [CategoryManifest],
}

/// List every example and category, in catalog order.
pub async fn run(paths: &Paths, json: bool) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let catalog = &workspace.catalog;

    if json {
        let listing = Listing {
            examples: catalog.examples(),
            categories: catalog.categories(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    output::print_header("Examples");
    for entry in catalog.examples() {
        let title = if entry.display_title.is_empty() {
            entry.description.as_str()
        } else {
            entry.display_title.as_str()
        };
        output::print_key_value(&entry.id, title);
    }

    output::print_header("Categories");
    for category in catalog.categories() {
        output::print_key_value(
            &category.id,
            &format!("{} [{}]", category.display_name, category.examples.join(", ")),
        );
    }
    println!();

    Ok(())
}
