//! Field combinators for folding config sources.
//!
//! Every field merges with [`first_set`]: the higher-precedence value is kept
//! unless it is unset, in which case the lower one is taken. Lists are never
//! concatenated.

use std::path::PathBuf;

use super::{FileMode, PartialConfig, PartialGenerate, PartialQuery};
use crate::templates::reference::TemplateReferences;

/// A value that can be absent from a config source.
pub trait Unset {
    /// True when the value is the zero value for its type.
    fn is_unset(&self) -> bool;
}

impl Unset for bool {
    fn is_unset(&self) -> bool {
        !*self
    }
}

impl Unset for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for PathBuf {
    fn is_unset(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl Unset for FileMode {
    fn is_unset(&self) -> bool {
        self.is_zero()
    }
}

impl<T> Unset for Vec<T> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for TemplateReferences {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Unset> Unset for Option<T> {
    fn is_unset(&self) -> bool {
        self.as_ref().is_none_or(Unset::is_unset)
    }
}

/// Keep `higher` unless it is unset.
pub fn first_set<T: Unset>(higher: T, lower: T) -> T {
    if higher.is_unset() {
        lower
    } else {
        higher
    }
}

/// Layer `lower` under `higher`, field by field.
pub fn layer(higher: PartialConfig, lower: PartialConfig) -> PartialConfig {
    PartialConfig {
        packages_query: layer_query(higher.packages_query, lower.packages_query),
        templates: first_set(higher.templates, lower.templates),
        generate: layer_generate(higher.generate, lower.generate),
        verbose: first_set(higher.verbose, lower.verbose),
    }
}

fn layer_query(higher: PartialQuery, lower: PartialQuery) -> PartialQuery {
    PartialQuery {
        include_tests: first_set(higher.include_tests, lower.include_tests),
        env: first_set(higher.env, lower.env),
        build_flags: first_set(higher.build_flags, lower.build_flags),
        dir: first_set(higher.dir, lower.dir),
        patterns: first_set(higher.patterns, lower.patterns),
    }
}

fn layer_generate(higher: PartialGenerate, lower: PartialGenerate) -> PartialGenerate {
    PartialGenerate {
        output: first_set(higher.output, lower.output),
        mode: first_set(higher.mode, lower.mode),
    }
}
