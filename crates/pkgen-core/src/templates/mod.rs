//! Template system for pkgen.
//!
//! Templates come from two places: the built-in bundle embedded into the binary
//! at compile time ([`embedded`]) and user-supplied files on disk. Which ones a
//! run uses is described by [`reference::TemplateReferences`]; the
//! [`resolver::TemplateResolver`] turns those into compiled
//! [`renderer::LoadedTemplate`]s.
//!
//! ## Template variables
//!
//! Templates use Handlebars syntax and render with the discovered package as
//! root value:
//! - `{{name}}`: package name (e.g. `foo`)
//! - `{{import_path}}`: import path (e.g. `example.com/app/foo`)
//! - `{{dir}}`: absolute package directory
//! - `{{go_files}}`: source file paths (iterate with `{{#each go_files}}`)
//! - `{{module.path}}`, `{{module.go_version}}`: owning module, when known
//!
//! Rendering is strict: a variable missing from the package is an error.

pub mod embedded;
pub mod reference;
pub mod renderer;
pub mod resolver;

pub use reference::{TemplateReference, TemplateReferences};
pub use renderer::LoadedTemplate;
pub use resolver::TemplateResolver;
