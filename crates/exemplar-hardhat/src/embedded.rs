//! Compile-time embedded templates for Hardhat projects.
//!
//! Each constant loads a template file from the workspace `templates/hardhat/`
//! directory via [`include_str!`]. The paths are relative to this source file
//! (`crates/exemplar-hardhat/src/embedded.rs`).
//!
//! ## Warning
//!
//! Do NOT rename or move template files without updating the `include_str!` path here.
//! Do NOT modify template files without checking that the Handlebars variables still match
//! what the composer passes in (`id`, `primary`, `contracts`).

/// `deploy/deploy.ts` for hardhat-deploy, one `deploy()` call per contract.
pub const DEPLOY_SCRIPT: &str = include_str!("../../../templates/hardhat/deploy.ts.hbs");
