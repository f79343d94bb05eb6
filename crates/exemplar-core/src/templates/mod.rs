//! Template rendering for generated project files.
//!
//! Framework crates embed their template sources at compile time (via
//! [`include_str!`]) and hand them to [`renderer::TemplateRenderer`], which renders
//! them with [Handlebars](https://handlebarsjs.com/).
//!
//! ## Template variables
//!
//! The deployment stub is rendered with:
//! - `{{id}}`: package name of the generated project
//! - `{{contracts}}`: declared contract symbols, in resolution order
//! - `{{primary}}`: the first of `contracts`

pub mod renderer;
