//! Handlebars-based template renderer for generated project files.
//!
//! Wraps the [`handlebars::Handlebars`] engine with **strict mode** enabled and HTML
//! escaping disabled. Strict mode ensures that any `{{variable}}` referenced in a
//! template must be present in the data context, otherwise rendering returns an
//! error. Escaping is off because the output is source code, not markup.
//!
//! ## Usage
//!
//! ```ignore
//! use exemplar_core::templates::renderer::TemplateRenderer;
//!
//! let renderer = TemplateRenderer::new();
//! let data = serde_json::json!({ "id": "example-foo", "contracts": ["Foo"] });
//! let output = renderer.render(framework.deploy_stub_template(), &data)?;
//! ```

use handlebars::Handlebars;
use serde_json::Value;

use crate::error::{ExemplarError, Result};

/// Template renderer using Handlebars for generating project files.
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a new renderer with strict mode enabled and escaping disabled.
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Render a template string with the given data context.
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        self.hbs
            .render_template(template, data)
            .map_err(|e| ExemplarError::TemplateRender(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
