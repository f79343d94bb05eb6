//! CLI command implementations for exemplar.
//!
//! Each module corresponds to a subcommand (`exemplar <command>`).

pub mod category;
pub mod example;
pub mod inject;
pub mod list;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::Select;

use exemplar_core::catalog::{Catalog, CategoryManifest, ManifestEntry};
use exemplar_core::config::ExemplarConfig;
use exemplar_core::framework::Framework;

use crate::output;

/// Config location plus command-line overrides.
pub struct Paths {
    pub config: PathBuf,
    pub assets: Option<PathBuf>,
    pub template: Option<PathBuf>,
}

/// Loaded configuration and catalog, shared by every command.
pub struct Workspace {
    pub config: ExemplarConfig,
    pub catalog: Catalog,
}

impl Workspace {
    pub fn load(paths: &Paths) -> Result<Self> {
        let mut config = ExemplarConfig::load_or_default(&paths.config)?;
        if let Some(assets) = &paths.assets {
            config.assets_root = assets.clone();
        }
        if let Some(template) = &paths.template {
            config.template_dir = template.clone();
        }

        let catalog_path = config.catalog_path();
        let catalog = Catalog::load(&catalog_path)
            .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
        tracing::info!(
            "catalog: {} example(s), {} category(ies)",
            catalog.examples().len(),
            catalog.categories().len()
        );

        Ok(Self { config, catalog })
    }

    /// Look up `id`, or let the user pick one when it was omitted.
    pub fn select_example(&self, id: Option<&str>) -> Result<&ManifestEntry> {
        if let Some(id) = id {
            return Ok(self.catalog.lookup_example(id)?);
        }

        let examples = self.catalog.examples();
        if examples.is_empty() {
            anyhow::bail!("the catalog has no examples");
        }
        let items: Vec<String> = examples.iter().map(describe_example).collect();
        let selection = prompt_selection("Select example", &items)?;
        Ok(&examples[selection])
    }

    /// Look up `id`, or let the user pick one when it was omitted.
    pub fn select_category(&self, id: Option<&str>) -> Result<&CategoryManifest> {
        if let Some(id) = id {
            return Ok(self.catalog.lookup_category(id)?);
        }

        let categories = self.catalog.categories();
        if categories.is_empty() {
            anyhow::bail!("the catalog has no categories");
        }
        let items: Vec<String> = categories
            .iter()
            .map(|c| format!("{} ({} examples)", c.display_name, c.examples.len()))
            .collect();
        let selection = prompt_selection("Select category", &items)?;
        Ok(&categories[selection])
    }
}

/// The framework generated and injected projects use.
pub fn framework() -> exemplar_hardhat::HardhatFramework {
    exemplar_hardhat::HardhatFramework::new()
}

fn describe_example(entry: &ManifestEntry) -> String {
    if entry.display_title.is_empty() {
        entry.id.clone()
    } else {
        format!("{} - {}", entry.id, entry.display_title)
    }
}

fn prompt_selection(prompt: &str, items: &[String]) -> Result<usize> {
    if !console::user_attended() {
        anyhow::bail!("no id given and no terminal to prompt on");
    }
    let selection = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?;
    Ok(selection)
}

/// Warn (never fail) about tools the generated project expects.
pub fn report_prerequisites(framework: &dyn Framework) {
    match framework.check_prerequisites() {
        Ok(()) => output::print_success("All required tools found"),
        Err(missing) => {
            for m in &missing {
                output::print_warning(&format!(
                    "Missing: {} (install: {})",
                    m.tool_name, m.install_instructions
                ));
            }
        }
    }
}

/// `path` relative to the working directory when possible, for display.
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
