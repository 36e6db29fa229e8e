//! Output file names.
//!
//! The name template is a Handlebars template rendered with a single field,
//! `template_name`. The default, `zz_generated.{{template_name}}.go`, yields
//! e.g. `zz_generated.pkgpath.go`.

use serde::Serialize;

use crate::error::{PkgenError, Result};
use crate::templates::LoadedTemplate;

const NAME_TEMPLATE: &str = "output_name";

#[derive(Serialize)]
struct NameContext<'a> {
    template_name: &'a str,
}

/// Computes destination file names from the configured name template.
#[derive(Debug)]
pub struct OutputNamer {
    template: LoadedTemplate,
}

impl OutputNamer {
    /// Compile the name template. A syntax error is fatal.
    pub fn new(name_template: &str) -> Result<Self> {
        let template = LoadedTemplate::compile(NAME_TEMPLATE, name_template)
            .map_err(|e| PkgenError::OutputName(e.to_string()))?;
        Ok(Self { template })
    }

    /// File name for output generated by the template called `template_name`.
    ///
    /// The result must be a bare, non-empty file name.
    pub fn file_name(&self, template_name: &str) -> Result<String> {
        let name = self
            .template
            .render(&NameContext { template_name })
            .map_err(|e| PkgenError::OutputName(e.to_string()))?;

        if name.trim().is_empty() {
            return Err(PkgenError::OutputName(format!(
                "rendered an empty file name for template '{template_name}'"
            )));
        }
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) || name == ".." {
            return Err(PkgenError::OutputName(format!(
                "'{name}' is not a plain file name"
            )));
        }

        Ok(name)
    }
}
