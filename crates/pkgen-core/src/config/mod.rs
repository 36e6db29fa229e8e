//! Layered configuration for a pkgen run.
//!
//! A run is configured from up to three partial sources plus built-in defaults,
//! in descending precedence:
//!
//! 1. command-line flags
//! 2. an explicitly named config file (`-config`, must exist)
//! 3. the implicit [`IMPLICIT_CONFIG_FILE`] in the working directory (optional)
//! 4. built-in defaults
//!
//! Every source deserializes into the same [`PartialConfig`] shape. The sources
//! are folded field by field (see [`merge`]): for scalars the first non-empty
//! value wins, for lists the first non-empty list wins whole. The result is an
//! immutable [`ResolvedConfig`].
//!
//! ## Config file layout
//!
//! ```yaml
//! packages_query:
//!   include_tests: false
//!   env: ["GOOS=linux"]
//!   build_flags: ["-tags=debug"]
//!   dir: ./
//!   patterns: ["./internal/..."]
//! templates:
//!   - pkgpath
//!   - template_file: ./tools/custom.tmpl
//! generate:
//!   output: "zz_generated.{{template_name}}.go"
//!   mod: "0o644"
//! verbose: false
//! ```

pub mod file_mode;
pub mod loader;
pub mod merge;
pub mod running_mode;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::templates::reference::TemplateReferences;

pub use file_mode::FileMode;
pub use loader::{resolve_config, ConfigRequest};
pub use running_mode::RunningMode;

/// Name of the config file picked up from the working directory when present.
pub const IMPLICIT_CONFIG_FILE: &str = ".pkgen.yml";

/// Pattern used when no source names any pattern: every package below `.`.
pub const DEFAULT_PATTERN: &str = "./...";

/// Pattern forced under `go generate`: only the package being generated.
pub const GO_GENERATE_PATTERN: &str = ".";

/// Default output file name template.
pub const DEFAULT_OUTPUT_NAME_TEMPLATE: &str = "zz_generated.{{template_name}}.go";

/// Default permission bits of generated files.
pub const DEFAULT_FILE_MODE: FileMode = FileMode::new(0o644);

/// Package query section of a single config source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialQuery {
    #[serde(default)]
    pub include_tests: bool,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub build_flags: Vec<String>,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Generation section of a single config source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialGenerate {
    /// Output file name template.
    #[serde(default)]
    pub output: Option<String>,
    /// Output file permission bits.
    #[serde(default, rename = "mod")]
    pub mode: Option<FileMode>,
}

/// One configuration source before merging. Unset fields are empty/zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub packages_query: PartialQuery,
    #[serde(default)]
    pub templates: TemplateReferences,
    #[serde(default)]
    pub generate: PartialGenerate,
    #[serde(default)]
    pub verbose: bool,
}

/// Resolved package query handed to the package loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryConfig {
    pub include_tests: bool,
    /// `K=V` overrides applied on top of the process environment.
    pub env: Vec<String>,
    pub build_flags: Vec<String>,
    /// Working directory of the query; `None` means the process directory.
    pub dir: Option<PathBuf>,
    /// Never empty once resolved.
    pub patterns: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            env: Vec::new(),
            build_flags: Vec::new(),
            dir: None,
            patterns: vec![DEFAULT_PATTERN.to_string()],
        }
    }
}

/// Resolved generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOptions {
    /// Handlebars template for the output file name, see [`crate::naming`].
    pub output_name_template: String,
    pub file_mode: FileMode,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            output_name_template: DEFAULT_OUTPUT_NAME_TEMPLATE.to_string(),
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

/// The single merged configuration driving one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    query: QueryConfig,
    templates: TemplateReferences,
    generate: GenerationOptions,
    verbose: bool,
    config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Merge `sources` (highest precedence first) over the built-in defaults.
    ///
    /// This is a pure function of its inputs: the running mode is passed in
    /// rather than read from the environment.
    pub fn resolve(
        sources: impl IntoIterator<Item = PartialConfig>,
        mode: RunningMode,
        config_file: Option<PathBuf>,
    ) -> Self {
        let merged = sources
            .into_iter()
            .fold(PartialConfig::default(), merge::layer);

        let defaults_query = QueryConfig::default();
        let defaults_generate = GenerationOptions::default();

        let mut query = QueryConfig {
            include_tests: merged.packages_query.include_tests,
            env: merged.packages_query.env,
            build_flags: merged.packages_query.build_flags,
            dir: merged.packages_query.dir.filter(|d| !d.as_os_str().is_empty()),
            patterns: merge::first_set(merged.packages_query.patterns, defaults_query.patterns),
        };

        if mode.is_go_generate() {
            query.patterns = vec![GO_GENERATE_PATTERN.to_string()];
        }

        let generate = GenerationOptions {
            output_name_template: merged
                .generate
                .output
                .filter(|o| !o.is_empty())
                .unwrap_or(defaults_generate.output_name_template),
            file_mode: merged
                .generate
                .mode
                .filter(|m| !m.is_zero())
                .unwrap_or(defaults_generate.file_mode),
        };

        Self {
            query,
            templates: merged.templates,
            generate,
            verbose: merged.verbose,
            config_file,
        }
    }

    pub fn query(&self) -> &QueryConfig {
        &self.query
    }

    pub fn templates(&self) -> &TemplateReferences {
        &self.templates
    }

    pub fn generate(&self) -> &GenerationOptions {
        &self.generate
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The explicitly named config file, as given on the command line.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::resolve([], RunningMode::Standalone, None)
    }
}
