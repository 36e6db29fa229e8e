//! Turning template references into compiled templates.

use std::path::Path;

use tracing::debug;

use super::embedded;
use super::reference::{TemplateReference, TemplateReferences};
use super::renderer::LoadedTemplate;
use crate::error::{PkgenError, Result, TemplateLookup};

/// Resolves references against the built-in bundle and the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResolver;

impl TemplateResolver {
    pub fn new() -> Self {
        Self
    }

    /// Load one template per reference, in order. Stops at the first failure.
    pub fn resolve_all(&self, references: &TemplateReferences) -> Result<Vec<LoadedTemplate>> {
        references.iter().map(|r| self.resolve(r)).collect()
    }

    pub fn resolve(&self, reference: &TemplateReference) -> Result<LoadedTemplate> {
        match reference {
            TemplateReference::Named(name) => self.builtin(name),
            TemplateReference::File(path) => self.custom(path),
        }
    }

    /// Look up a template of the built-in bundle by exact name.
    pub fn builtin(&self, name: &str) -> Result<LoadedTemplate> {
        let lookup = || TemplateLookup::Name(name.to_string());
        let source = embedded::get(name).ok_or_else(|| {
            debug!(
                template = name,
                available = ?embedded::names().collect::<Vec<_>>(),
                "unknown built-in template"
            );
            PkgenError::TemplateNotFound {
                lookup: lookup(),
                source: None,
            }
        })?;
        debug!(template = name, "loaded built-in template");
        LoadedTemplate::compile(name, source)
            .map_err(|e| PkgenError::template_not_found(lookup(), e.to_string()))
    }

    /// Load a template file. Its name is the file name without extension.
    pub fn custom(&self, path: &Path) -> Result<LoadedTemplate> {
        let lookup = || TemplateLookup::File(path.to_path_buf());

        let canonical = path
            .canonicalize()
            .map_err(|e| PkgenError::template_not_found(lookup(), e))?;
        let source = std::fs::read_to_string(&canonical)
            .map_err(|e| PkgenError::template_not_found(lookup(), e))?;

        let name = canonical
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PkgenError::template_not_found(lookup(), "template file has no usable name")
            })?;

        debug!(template = %name, path = %canonical.display(), "loaded custom template");
        LoadedTemplate::compile(name, &source)
            .map_err(|e| PkgenError::template_not_found(lookup(), e.to_string()))
    }
}
