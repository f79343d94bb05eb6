//! Hardhat framework support for exemplar.
//!
//! Generated projects follow the Hardhat + hardhat-deploy layout:
//!
//! ```text
//! <project>/
//! ├── hardhat.config.ts          # build config (marker)
//! ├── package.json               # package manifest (marker)
//! ├── contracts/<Contract>.sol
//! ├── test/<Contract>.ts
//! └── deploy/deploy.ts           # generated, deploys every example contract
//! ```
//!
//! **Prerequisites** for the generated project: `node`, `npm`

mod embedded;
pub mod solidity;

use std::path::{Path, PathBuf};

use exemplar_core::framework::{with_source_extension, Framework, PrerequisiteError};

/// Placeholder task module shipped by the base template and imported by its config.
const PLACEHOLDER_TASK: &str = "tasks/Counter.ts";

/// Hardhat + Solidity projects.
pub struct HardhatFramework;

impl Default for HardhatFramework {
    fn default() -> Self {
        Self
    }
}

impl HardhatFramework {
    pub fn new() -> Self {
        Self
    }
}

impl Framework for HardhatFramework {
    fn name(&self) -> &'static str {
        "hardhat"
    }

    fn display_name(&self) -> &'static str {
        "Hardhat"
    }

    fn marker_files(&self) -> &'static [&'static str] {
        &["hardhat.config.ts", "package.json"]
    }

    fn package_manifest(&self) -> &'static str {
        "package.json"
    }

    fn build_config(&self) -> &'static str {
        "hardhat.config.ts"
    }

    /// Drop `import "./tasks/Counter";` (the task file is a removed placeholder).
    fn rewrite_build_config(&self, contents: &str) -> String {
        let module = PLACEHOLDER_TASK.trim_end_matches(".ts");
        let double = format!("\"./{module}\"");
        let single = format!("'./{module}'");

        let mut out = String::with_capacity(contents.len());
        for line in contents.split_inclusive('\n') {
            let trimmed = line.trim_start();
            if trimmed.starts_with("import") && (line.contains(&double) || line.contains(&single))
            {
                tracing::debug!("removing placeholder import: {}", line.trim_end());
                continue;
            }
            out.push_str(line);
        }
        out
    }

    fn placeholder_files(&self) -> &'static [&'static str] {
        &[
            "contracts/Counter.sol",
            "test/Counter.ts",
            "test/CounterSepolia.ts",
            "deploy/deploy.ts",
            PLACEHOLDER_TASK,
        ]
    }

    fn copy_exclusions(&self) -> &'static [&'static str] {
        &[
            ".git",
            "node_modules",
            "artifacts",
            "cache",
            "coverage",
            "typechain-types",
            "deployments",
        ]
    }

    /// The first `contract` declared in the file.
    fn declared_symbol(&self, source: &str) -> Option<String> {
        solidity::declared_contracts(source).into_iter().next()
    }

    fn contract_destination(&self, symbol: &str) -> PathBuf {
        PathBuf::from("contracts").join(format!("{symbol}.sol"))
    }

    fn test_destination(&self, symbol: &str, test_source: &Path) -> PathBuf {
        PathBuf::from("test").join(with_source_extension(symbol, test_source))
    }

    fn deploy_stub_path(&self, _primary_symbol: &str) -> PathBuf {
        PathBuf::from("deploy/deploy.ts")
    }

    fn deploy_stub_template(&self) -> &'static str {
        embedded::DEPLOY_SCRIPT
    }

    fn check_prerequisites(&self) -> std::result::Result<(), Vec<PrerequisiteError>> {
        let mut missing = Vec::new();

        if which::which("node").is_err() {
            missing.push(PrerequisiteError {
                tool_name: "node".into(),
                install_instructions: "https://nodejs.org/".into(),
            });
        }

        if which::which("npm").is_err() {
            missing.push(PrerequisiteError {
                tool_name: "npm".into(),
                install_instructions: "ships with Node.js: https://nodejs.org/".into(),
            });
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}
