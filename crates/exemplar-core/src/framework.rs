use std::path::{Path, PathBuf};

/// Information about a missing prerequisite tool.
#[derive(Debug, Clone)]
pub struct PrerequisiteError {
    pub tool_name: String,
    pub install_instructions: String,
}

/// Everything the engine needs to know about the kind of project it scaffolds.
///
/// The resolver, composer and injection engine never hard-code a layout: every
/// destination path, marker file and template comes from here.
pub trait Framework: Send + Sync {
    /// Short identifier: "hardhat".
    fn name(&self) -> &'static str;

    /// Display name for user-facing output.
    fn display_name(&self) -> &'static str;

    /// Relative paths that must all exist for a directory to count as a project of
    /// this kind.
    fn marker_files(&self) -> &'static [&'static str];

    /// Relative path of the JSON package manifest.
    fn package_manifest(&self) -> &'static str;

    /// Manifest key that extra dependencies are merged under.
    fn dependency_section(&self) -> &'static str {
        "dependencies"
    }

    /// Relative path of the build-config file that may reference placeholder files.
    fn build_config(&self) -> &'static str;

    /// Rewrite the build config after placeholders have been removed.
    fn rewrite_build_config(&self, contents: &str) -> String {
        contents.to_string()
    }

    /// Files shipped by the base template that only exist as placeholders.
    fn placeholder_files(&self) -> &'static [&'static str];

    /// Top-level directory names never copied out of the base template.
    fn copy_exclusions(&self) -> &'static [&'static str] {
        &[]
    }

    /// The type/contract identifier declared in a primary source file.
    fn declared_symbol(&self, source: &str) -> Option<String>;

    /// Where the primary source for `symbol` lands, relative to the project root.
    fn contract_destination(&self, symbol: &str) -> PathBuf;

    /// Where the test suite for `symbol` lands, relative to the project root.
    fn test_destination(&self, symbol: &str, test_source: &Path) -> PathBuf;

    /// Relative path of the generated deployment stub.
    fn deploy_stub_path(&self, primary_symbol: &str) -> PathBuf;

    /// Handlebars template for the deployment stub.
    ///
    /// Rendered with `id` (the package name) and `contracts` (declared symbols, in
    /// resolution order).
    fn deploy_stub_template(&self) -> &'static str;

    /// Check that the tools a generated project expects are installed.
    fn check_prerequisites(&self) -> std::result::Result<(), Vec<PrerequisiteError>> {
        Ok(())
    }
}

/// Keep `path`'s extension (if any) on a new file name.
pub fn with_source_extension(stem: &str, source: &Path) -> String {
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}
