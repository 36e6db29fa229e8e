//! Core library for pkgen.
//!
//! pkgen discovers Go packages matching query patterns and renders templates
//! into each of them, writing one generated file per (package, template) pair.
//!
//! - [`config`]: layered configuration (flags, config files, defaults)
//! - [`templates`]: template references, the built-in bundle, custom files
//! - [`naming`]: output file names
//! - [`package`]: package discovery behind the [`package::PackageLoader`] seam
//! - [`pipeline`]: the fail-fast generation loop
//!
//! It is meant to run standalone or from a `//go:generate pkgen` directive, in
//! which case only the package holding the directive is generated.

pub mod config;
pub mod error;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod templates;
