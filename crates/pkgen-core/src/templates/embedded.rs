//! Built-in template bundle, embedded at compile time.
//!
//! Each template is loaded from `templates/` via [`include_str!`]; the paths are
//! relative to this source file (`crates/pkgen-core/src/templates/embedded.rs`).
//!
//! ## Adding a new template
//!
//! 1. Place `<name>.tmpl` under `crates/pkgen-core/templates/`
//! 2. Add a `pub const` here and an entry to [`BUILTIN`]
//! 3. Only use fields of [`crate::package::DiscoveredPackage`]; rendering is strict

pub const PKGPATH: &str = include_str!("../../templates/pkgpath.tmpl");
pub const OTEL: &str = include_str!("../../templates/otel.tmpl");

/// Name → source of every built-in template.
pub const BUILTIN: &[(&str, &str)] = &[("pkgpath", PKGPATH), ("otel", OTEL)];

/// Exact-match lookup of a built-in template source.
pub fn get(name: &str) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

/// Names of all built-in templates, in bundle order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}
