//! Compiled, executable templates backed by Handlebars.
//!
//! Every template gets its own [`handlebars::Handlebars`] registry with
//! **strict mode** on: referencing a field that is not in the data context is a
//! render error, never an empty string. HTML escaping is turned off because the
//! output is source code, not markup.
//!
//! ```ignore
//! let tmpl = LoadedTemplate::compile("pkgpath", "package {{name}}\n")?;
//! let out = tmpl.render(&serde_json::json!({ "name": "foo" }))?;
//! assert_eq!(out, "package foo\n");
//! ```

use std::fmt;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{PkgenError, Result};

/// A named template, compiled once and rendered any number of times.
pub struct LoadedTemplate {
    name: String,
    hbs: Handlebars<'static>,
}

impl LoadedTemplate {
    /// Compile `source` under `name`.
    pub fn compile(
        name: impl Into<String>,
        source: &str,
    ) -> std::result::Result<Self, handlebars::TemplateError> {
        let name = name.into();
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.register_template_string(&name, source)?;
        Ok(Self { name, hbs })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with `data` as the root value.
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        self.hbs
            .render(&self.name, data)
            .map_err(|e| PkgenError::TemplateRender {
                template: self.name.clone(),
                message: e.to_string(),
            })
    }
}

impl fmt::Debug for LoadedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        let tmpl = LoadedTemplate::compile("t", "package {{name}}").unwrap();
        assert_eq!(tmpl.name(), "t");
        assert_eq!(tmpl.render(&json!({ "name": "foo" })).unwrap(), "package foo");
    }

    #[test]
    fn test_no_html_escaping() {
        let tmpl = LoadedTemplate::compile("t", "const P = \"{{path}}\"").unwrap();
        let out = tmpl.render(&json!({ "path": "a/b<c>&\"d\"" })).unwrap();
        assert_eq!(out, "const P = \"a/b<c>&\"d\"\"");
    }

    #[test]
    fn test_missing_field_is_error() {
        let tmpl = LoadedTemplate::compile("t", "{{missing}}").unwrap();
        let err = tmpl.render(&json!({ "name": "foo" })).unwrap_err();
        assert!(matches!(err, PkgenError::TemplateRender { ref template, .. } if template == "t"));
    }

    #[test]
    fn test_compile_error() {
        assert!(LoadedTemplate::compile("t", "{{#if}}unclosed").is_err());
    }

    #[test]
    fn test_iterates_lists() {
        let tmpl = LoadedTemplate::compile("t", "{{#each files}}{{this}};{{/each}}").unwrap();
        let out = tmpl.render(&json!({ "files": ["a.go", "b.go"] })).unwrap();
        assert_eq!(out, "a.go;b.go;");
    }
}
