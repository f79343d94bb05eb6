//! Core library for the exemplar toolkit.
//!
//! Turns a catalog of reusable smart-contract assets into ready-to-run example
//! projects. Two modes share one resolution step:
//!
//! - **Build mode** ([`composer::Composer`]): a fresh project directory from a base
//!   template plus the resolved assets.
//! - **Inject mode** ([`inject::Injector`]): the same assets merged into an existing
//!   project, with per-file conflict decisions and rollback on failure.
//!
//! The engine is framework-agnostic. Layout, marker files and templates come from a
//! [`framework::Framework`] implementation:
//! - [`exemplar_hardhat`](https://docs.rs/exemplar-hardhat): Hardhat + Solidity
//!
//! ```text
//! catalog ──► resolver ──► AssetSet ──┬──► composer  (new directory)
//!                                     └──► injector  (existing project, transaction log)
//! ```

pub mod catalog;
pub mod composer;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod framework;
pub mod inject;
pub mod manifest;
pub mod resolver;
pub mod templates;
pub mod transaction;

#[cfg(test)]
mod testing;
